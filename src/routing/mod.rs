/*!

A `Routing` computes, for the head flit of a packet, the candidate output
directions at the current node. The `Selection` policy then narrows the
candidates to a single port.

see [`new_routing`](fn.new_routing.html) for the builder and the predefined
algorithms.

Routings are pure with respect to the router: they receive a read-only
[RouterView] and the [RouteData] of the packet and return an ordered,
non-empty list of legal cardinal-or-hub directions. They must position
themselves with `data.current_id` rather than `view.local_id`, since the
neighbours-on-path selection re-runs them on hypothetical next-hop data.

*/

/// Contains XY, WestFirst, NorthLast, NegativeFirst, OddEven, Dyad.
pub mod mesh;
/// Contains the table-driven routing and the routing tables.
pub mod table;

use std::fmt::Debug;

use crate::config::ConfigurationValue;
use crate::error::Error;
use crate::topology::{Direction,MeshData};
use crate::Plugs;
use self::mesh::{XY,WestFirst,NorthLast,NegativeFirst,OddEven,Dyad};
use self::table::{Table,RoutingTable};

pub use self::table::GlobalRoutingTable;

///Information about the packet being routed, passed to the `Routing`.
#[derive(Clone,Copy,Debug)]
pub struct RouteData
{
	///The node at which the routing decision is being taken. During
	///neighbours-on-path lookahead this is a neighbour of the router
	///actually deciding.
	pub current_id: usize,
	pub src_id: usize,
	pub dst_id: usize,
	///Direction from which the packet entered the current node.
	pub dir_in: Direction,
}

///Read-only view of the router consulting a routing, so that algorithms can
///inspect the topology and telemetry without touching router state.
pub struct RouterView<'a>
{
	pub local_id: usize,
	pub mesh: &'a MeshData,
	///The routing table specialized to this router, invalid unless a global
	///table was applied at configure time.
	pub routing_table: &'a RoutingTable,
	///Whether a cardinal neighbour of this router is past the congestion
	///threshold. Consumed by `Dyad`.
	pub in_congestion: bool,
}

///An algorithm providing candidate exit directions when the router requires.
pub trait Routing : Debug
{
	///Compute the ordered list of candidate output directions. The list is
	///never empty and contains only directions legal at `data.current_id`:
	///no disabled boundary ports and no U-turn onto `data.dir_in`.
	///It is an error to consult a routing for a packet already at its
	///destination; the router short-circuits those to the local port.
	fn route(&self, view:&RouterView, data:&RouteData) -> Result<Vec<Direction>,Error>;
}

///The argument of a builder function for `Routing`s.
pub struct RoutingBuilderArgument<'a>
{
	///A ConfigurationValue::Object defining the routing.
	pub cv: &'a ConfigurationValue,
	///The user defined plugs. In case the routing needs to create elements.
	pub plugs: &'a Plugs,
}

/**Build a new routing.

Predefined routings, all for the 2D mesh:

```ignore
XY { }            //deterministic dimension-order, x before y
WestFirst { }     //turn model: west hops first, then adaptive
NorthLast { }     //turn model: north hops last
NegativeFirst { } //turn model: negative hops (north/west) first
OddEven { }       //odd-even turn model, adaptive
Dyad { }          //OddEven while congested, XY otherwise
Table { }         //admissible outputs from the configured routing table
```
*/
pub fn new_routing(arg:RoutingBuilderArgument) -> Box<dyn Routing>
{
	if let &ConfigurationValue::Object(ref cv_name, ref _cv_pairs) = arg.cv
	{
		if let Some(builder) = arg.plugs.routings.get(cv_name)
		{
			return builder(arg);
		}
		match cv_name.as_ref()
		{
			"XY" => Box::new(XY::new(arg)),
			"WestFirst" => Box::new(WestFirst::new(arg)),
			"NorthLast" => Box::new(NorthLast::new(arg)),
			"NegativeFirst" => Box::new(NegativeFirst::new(arg)),
			"OddEven" => Box::new(OddEven::new(arg)),
			"Dyad" => Box::new(Dyad::new(arg)),
			"Table" => Box::new(Table::new(arg)),
			_ => panic!("Unknown Routing {}",cv_name),
		}
	}
	else
	{
		panic!("Trying to create a Routing from a non-Object");
	}
}

///The cardinal directions that bring `current` strictly closer to `target`
///in the mesh. Empty only when both coincide.
pub(crate) fn productive_directions(mesh:&MeshData, current:usize, target:usize) -> Vec<Direction>
{
	let current = mesh.id_to_coord(current);
	let target = mesh.id_to_coord(target);
	let mut directions = Vec::with_capacity(2);
	if target.x > current.x
	{
		directions.push(Direction::East);
	}
	if target.x < current.x
	{
		directions.push(Direction::West);
	}
	if target.y > current.y
	{
		directions.push(Direction::South);
	}
	if target.y < current.y
	{
		directions.push(Direction::North);
	}
	directions
}
