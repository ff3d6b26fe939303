/*!

Routing algorithms for the 2D mesh.

* XY
* WestFirst
* NorthLast
* NegativeFirst
* OddEven
* Dyad

The turn-model algorithms restrict which turns a packet may take so that no
cycle of channel dependencies can form; the candidate sets below are the
classical ones. `OddEven` conditions the allowed turns on the parity of the
current column. `Dyad` switches between deterministic `XY` and adaptive
`OddEven` depending on the congestion of the router's neighbourhood.

*/

use crate::match_object_panic;
use crate::error::Error;
use crate::routing::{Routing,RouterView,RouteData,RoutingBuilderArgument,productive_directions};
use crate::topology::Direction;

///Deterministic dimension-order routing: exhaust the x offset, then the y
///offset. Always a single candidate.
#[derive(Debug)]
pub struct XY
{
}

impl Routing for XY
{
	fn route(&self, view:&RouterView, data:&RouteData) -> Result<Vec<Direction>,Error>
	{
		let current = view.mesh.id_to_coord(data.current_id);
		let destination = view.mesh.id_to_coord(data.dst_id);
		let direction = if destination.x > current.x
		{
			Direction::East
		}
		else if destination.x < current.x
		{
			Direction::West
		}
		else if destination.y > current.y
		{
			Direction::South
		}
		else if destination.y < current.y
		{
			Direction::North
		}
		else
		{
			panic!("routing a packet already at its destination (router {})",data.current_id);
		};
		Ok(vec![direction])
	}
}

impl XY
{
	pub fn new(arg:RoutingBuilderArgument) -> XY
	{
		match_object_panic!(arg.cv,"XY",_value);
		XY{}
	}
}

///West-first turn model: all west hops are taken before anything else;
///afterwards the packet may route adaptively among the productive
///directions.
#[derive(Debug)]
pub struct WestFirst
{
}

impl Routing for WestFirst
{
	fn route(&self, view:&RouterView, data:&RouteData) -> Result<Vec<Direction>,Error>
	{
		let current = view.mesh.id_to_coord(data.current_id);
		let destination = view.mesh.id_to_coord(data.dst_id);
		if destination.x < current.x
		{
			return Ok(vec![Direction::West]);
		}
		let directions = productive_directions(view.mesh,data.current_id,data.dst_id);
		if directions.is_empty()
		{
			panic!("routing a packet already at its destination (router {})",data.current_id);
		}
		Ok(directions)
	}
}

impl WestFirst
{
	pub fn new(arg:RoutingBuilderArgument) -> WestFirst
	{
		match_object_panic!(arg.cv,"WestFirst",_value);
		WestFirst{}
	}
}

///North-last turn model: no turn is allowed after a north hop, so north is
///offered only once the column is already correct.
#[derive(Debug)]
pub struct NorthLast
{
}

impl Routing for NorthLast
{
	fn route(&self, view:&RouterView, data:&RouteData) -> Result<Vec<Direction>,Error>
	{
		let current = view.mesh.id_to_coord(data.current_id);
		let destination = view.mesh.id_to_coord(data.dst_id);
		if destination.y < current.y
		{
			//A north segment is pending. It can only be the last one.
			if destination.x == current.x
			{
				return Ok(vec![Direction::North]);
			}
			let direction = if destination.x > current.x { Direction::East } else { Direction::West };
			return Ok(vec![direction]);
		}
		let directions = productive_directions(view.mesh,data.current_id,data.dst_id);
		if directions.is_empty()
		{
			panic!("routing a packet already at its destination (router {})",data.current_id);
		}
		Ok(directions)
	}
}

impl NorthLast
{
	pub fn new(arg:RoutingBuilderArgument) -> NorthLast
	{
		match_object_panic!(arg.cv,"NorthLast",_value);
		NorthLast{}
	}
}

///Negative-first turn model: the decreasing-coordinate hops (north and west)
///are all taken before any increasing one.
#[derive(Debug)]
pub struct NegativeFirst
{
}

impl Routing for NegativeFirst
{
	fn route(&self, view:&RouterView, data:&RouteData) -> Result<Vec<Direction>,Error>
	{
		let current = view.mesh.id_to_coord(data.current_id);
		let destination = view.mesh.id_to_coord(data.dst_id);
		let mut directions = Vec::with_capacity(2);
		if destination.x < current.x
		{
			directions.push(Direction::West);
		}
		if destination.y < current.y
		{
			directions.push(Direction::North);
		}
		if directions.is_empty()
		{
			if destination.x > current.x
			{
				directions.push(Direction::East);
			}
			if destination.y > current.y
			{
				directions.push(Direction::South);
			}
		}
		if directions.is_empty()
		{
			panic!("routing a packet already at its destination (router {})",data.current_id);
		}
		Ok(directions)
	}
}

impl NegativeFirst
{
	pub fn new(arg:RoutingBuilderArgument) -> NegativeFirst
	{
		match_object_panic!(arg.cv,"NegativeFirst",_value);
		NegativeFirst{}
	}
}

///Odd-even turn model. East-north and east-south turns are forbidden in odd
///columns, north-west and south-west turns in even columns; what remains is
///offered adaptively.
#[derive(Debug)]
pub struct OddEven
{
}

impl Routing for OddEven
{
	fn route(&self, view:&RouterView, data:&RouteData) -> Result<Vec<Direction>,Error>
	{
		let source = view.mesh.id_to_coord(data.src_id);
		let current = view.mesh.id_to_coord(data.current_id);
		let destination = view.mesh.id_to_coord(data.dst_id);
		let ex = destination.x as i32 - current.x as i32;
		let ey = destination.y as i32 - current.y as i32;
		let mut directions = Vec::with_capacity(2);
		if ex == 0
		{
			if ey > 0
			{
				directions.push(Direction::South);
			}
			else
			{
				directions.push(Direction::North);
			}
		}
		else if ex > 0
		{
			if ey == 0
			{
				directions.push(Direction::East);
			}
			else
			{
				//Turning off the east row is only allowed where the next
				//column cannot demand a forbidden turn back.
				if current.x % 2 == 1 || current.x == source.x
				{
					directions.push(if ey > 0 { Direction::South } else { Direction::North });
				}
				if destination.x % 2 == 1 || ex != 1
				{
					directions.push(Direction::East);
				}
			}
		}
		else
		{
			directions.push(Direction::West);
			if current.x % 2 == 0 && ey != 0
			{
				directions.push(if ey > 0 { Direction::South } else { Direction::North });
			}
		}
		if directions.is_empty()
		{
			panic!("odd-even produced no candidates at router {} for destination {}",data.current_id,data.dst_id);
		}
		Ok(directions)
	}
}

impl OddEven
{
	pub fn new(arg:RoutingBuilderArgument) -> OddEven
	{
		match_object_panic!(arg.cv,"OddEven",_value);
		OddEven{}
	}
}

///DyAD: deterministic XY while the neighbourhood is calm, adaptive OddEven
///once the router reports congestion.
#[derive(Debug)]
pub struct Dyad
{
	deterministic: XY,
	adaptive: OddEven,
}

impl Routing for Dyad
{
	fn route(&self, view:&RouterView, data:&RouteData) -> Result<Vec<Direction>,Error>
	{
		if view.in_congestion
		{
			self.adaptive.route(view,data)
		}
		else
		{
			self.deterministic.route(view,data)
		}
	}
}

impl Dyad
{
	pub fn new(arg:RoutingBuilderArgument) -> Dyad
	{
		match_object_panic!(arg.cv,"Dyad",_value);
		Dyad{
			deterministic: XY{},
			adaptive: OddEven{},
		}
	}
}
