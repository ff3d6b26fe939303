/*!

Table-driven routing.

A `GlobalRoutingTable` holds, for every node, the admissible output
directions per (input direction, destination) pair. Building such a table
(e.g. from a link-state description of the mesh) is the job of the
embedding application; here we keep the type, its per-router specialization
applied at configure time, and the `Table` routing that consults it.

*/

use crate::match_object_panic;
use crate::error;
use crate::error::Error;
use crate::matrix::Matrix;
use crate::routing::{Routing,RouterView,RouteData,RoutingBuilderArgument};
use crate::topology::{Direction,PORTS};

///Admissible outputs for every node of the mesh. An invalid table is the
///default and leaves the routers without table data.
#[derive(Clone,Debug)]
pub struct GlobalRoutingTable
{
	valid: bool,
	///One table per node; rows are input directions, columns destinations.
	nodes: Vec<Matrix<Vec<Direction>>>,
}

impl GlobalRoutingTable
{
	///A table usable by no router.
	pub fn invalid() -> GlobalRoutingTable
	{
		GlobalRoutingTable{ valid: false, nodes: vec![] }
	}
	///An empty valid table for a mesh of `num_nodes` routers. Entries start
	///with no admissible outputs and are filled with `set_entry`.
	pub fn new(num_nodes:usize) -> GlobalRoutingTable
	{
		GlobalRoutingTable{
			valid: true,
			nodes: (0..num_nodes).map(|_|Matrix::constant(Vec::new(),PORTS,num_nodes)).collect(),
		}
	}
	pub fn is_valid(&self) -> bool
	{
		self.valid
	}
	pub fn set_entry(&mut self, node:usize, dir_in:Direction, destination:usize, outputs:Vec<Direction>)
	{
		*self.nodes[node].get_mut(dir_in.index(),destination) = outputs;
	}
	fn node_table(&self, node:usize) -> &Matrix<Vec<Direction>>
	{
		&self.nodes[node]
	}
}

///The slice of the global table owned by one router.
#[derive(Clone,Debug)]
pub struct RoutingTable
{
	valid: bool,
	entries: Option<Matrix<Vec<Direction>>>,
}

impl RoutingTable
{
	pub fn invalid() -> RoutingTable
	{
		RoutingTable{ valid: false, entries: None }
	}
	///Specialize the global table to the given router.
	pub fn configure(&mut self, global:&GlobalRoutingTable, node:usize)
	{
		self.valid = true;
		self.entries = Some(global.node_table(node).clone());
	}
	pub fn is_valid(&self) -> bool
	{
		self.valid
	}
	///The admissible outputs for a packet entered from `dir_in` towards
	///`destination`.
	pub fn get_admissible_outputs(&self, dir_in:Direction, destination:usize) -> &[Direction]
	{
		match self.entries
		{
			Some(ref entries) => entries.get(dir_in.index(),destination),
			None => panic!("consulting an unconfigured routing table"),
		}
	}
}

///Routing through the table applied to the router at configure time.
#[derive(Debug)]
pub struct Table
{
}

impl Routing for Table
{
	fn route(&self, view:&RouterView, data:&RouteData) -> Result<Vec<Direction>,Error>
	{
		if !view.routing_table.is_valid()
		{
			panic!("Table routing requires a valid routing table");
		}
		let outputs = view.routing_table.get_admissible_outputs(data.dir_in,data.dst_id);
		if outputs.is_empty()
		{
			return Err(error!(no_candidates).with_message(format!("the routing table has no output for destination {} entering router {} from {}",data.dst_id,view.local_id,data.dir_in)));
		}
		Ok(outputs.to_vec())
	}
}

impl Table
{
	pub fn new(arg:RoutingBuilderArgument) -> Table
	{
		match_object_panic!(arg.cv,"Table",_value);
		Table{}
	}
}
