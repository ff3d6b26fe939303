/*!

The selection policy narrows the candidate directions given by the routing
to the single output the head flit will try to reserve.

The set of policies is closed and chosen globally, so it is a plain tagged
variant rather than a trait object. The router hands the policy a small
context with the local reservation availability, the neighbour telemetry
latches, the routing itself (for the neighbours-on-path lookahead) and the
per-router random generator for tie-breaking.

*/

use itertools::Itertools;
use ::rand::rngs::StdRng;
use ::rand::prelude::SliceRandom;

use crate::match_object_panic;
use crate::config::ConfigurationValue;
use crate::error;
use crate::error::Error;
use crate::reservation::ReservationTable;
use crate::routing::{Routing,RouterView,RouteData};
use crate::topology::{Direction,PORTS,DIRECTIONS};
use crate::NoPData;
use crate::Plugs;

///Strategy to pick one direction among the routing candidates.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum Selection
{
	///Uniform pick.
	Random,
	///Prefer available outputs whose neighbour buffer has the most free
	///slots.
	BufferLevel,
	///Neighbours-on-path: score each candidate by the congestion its
	///neighbour reports on the onward channels.
	Nop,
}

///What the selection policies may look at.
pub struct SelectionContext<'a,'b>
{
	pub view: &'a RouterView<'b>,
	pub routing: &'a dyn Routing,
	pub reservations: &'a ReservationTable,
	///Free slots in each neighbour's facing buffer, indexed by port.
	pub free_slots_neighbor: &'a [usize;PORTS],
	///Last NoP record published by each cardinal neighbour.
	pub nop_status: &'a [NoPData;DIRECTIONS],
	pub rng: &'a mut StdRng,
}

///The argument of a builder function for `Selection`.
pub struct SelectionBuilderArgument<'a>
{
	///A ConfigurationValue::Object defining the selection.
	pub cv: &'a ConfigurationValue,
	///The user defined plugs, for uniformity with the other builders.
	pub plugs: &'a Plugs,
}

///Build a selection policy from `Random { }`, `BufferLevel { }` or
///`NoP { }`. The set is closed; unknown names are a configuration error.
pub fn new_selection(arg:SelectionBuilderArgument) -> Selection
{
	if let &ConfigurationValue::Object(ref cv_name, ref _cv_pairs) = arg.cv
	{
		match cv_name.as_ref()
		{
			"Random" =>
			{
				match_object_panic!(arg.cv,"Random",_value);
				Selection::Random
			},
			"BufferLevel" =>
			{
				match_object_panic!(arg.cv,"BufferLevel",_value);
				Selection::BufferLevel
			},
			"NoP" =>
			{
				match_object_panic!(arg.cv,"NoP",_value);
				Selection::Nop
			},
			_ => panic!("Unknown Selection {}",cv_name),
		}
	}
	else
	{
		panic!("Trying to create a Selection from a non-Object");
	}
}

impl Selection
{
	///Whether the policy consumes the free-slot/NoP telemetry, so that the
	///buffer monitor knows to publish it.
	pub fn uses_telemetry(self) -> bool
	{
		match self
		{
			Selection::Random => false,
			Selection::BufferLevel | Selection::Nop => true,
		}
	}
	///Pick exactly one direction from a non-empty candidate list. Callers
	///short-circuit single-element lists themselves.
	pub fn select(&self, ctx:&mut SelectionContext, candidates:&[Direction], data:&RouteData) -> Result<Direction,Error>
	{
		match self
		{
			Selection::Random => Ok(random_pick(candidates,ctx.rng)),
			Selection::BufferLevel => Ok(select_buffer_level(ctx,candidates)),
			Selection::Nop => select_nop(ctx,candidates,data),
		}
	}
}

fn random_pick(candidates:&[Direction], rng:&mut StdRng) -> Direction
{
	*candidates.choose(rng).expect("selection requires a non-empty candidate list")
}

///Among the candidates whose output is not reserved, keep those whose
///neighbour reports the most free slots and break ties at random. With no
///available candidate, fall back to a uniform pick over the full list.
fn select_buffer_level(ctx:&mut SelectionContext, candidates:&[Direction]) -> Direction
{
	let best = candidates.iter()
		.filter(|d|ctx.reservations.is_available(d.index()))
		.max_set_by_key(|d|ctx.free_slots_neighbor[d.index()]);
	if best.is_empty()
	{
		random_pick(candidates,ctx.rng)
	}
	else
	{
		**best.choose(ctx.rng).unwrap()
	}
}

///Score of one candidate: what the neighbour in that direction reported for
///the channels the packet would want next.
fn nop_score(nop:&NoPData, onward:&[Direction]) -> usize
{
	onward.iter().map(|c|{
		let status = &nop.channel_status_neighbor[c.index()];
		if status.available { status.free_slots } else { 0 }
	}).sum()
}

fn select_nop(ctx:&mut SelectionContext, candidates:&[Direction], data:&RouteData) -> Result<Direction,Error>
{
	let mut scored = Vec::with_capacity(candidates.len());
	for &direction in candidates
	{
		//Lookahead only makes sense through the mesh links.
		if !direction.is_cardinal()
		{
			return Err(error!(bad_argument).with_message(format!("NoP cannot look ahead through {}",direction)));
		}
		let neighbour = match ctx.view.mesh.neighbour_id(data.current_id,direction)
		{
			Some(neighbour) => neighbour,
			None => return Err(error!(bad_argument).with_message(format!("NoP candidate {} has no neighbour at router {}",direction,data.current_id))),
		};
		//Hypothetical next-hop data: the packet sits at the neighbour,
		//having entered from the reflex of the candidate direction.
		let next_data = RouteData{
			current_id: neighbour,
			src_id: data.src_id,
			dst_id: data.dst_id,
			dir_in: direction.reflex(),
		};
		let onward = ctx.routing.route(ctx.view,&next_data)?;
		let nop = &ctx.nop_status[direction.index()];
		scored.push((direction,nop_score(nop,&onward)));
	}
	let best = scored.iter().max_set_by_key(|&&(_,score)|score);
	Ok(best.choose(ctx.rng).unwrap().0)
}
