/*!
flitmesh
=====

This crate provides a cycle-accurate simulator core for wormhole-switched
networks-on-chip on a 2D mesh. Each node of the mesh holds an input-buffered
router and a processing-element endpoint; packets are split into flits
(head, bodies, tail) that traverse one link per handshake under
alternating-bit flow control, while a reservation table per router keeps the
flits of a packet glued to a single output from head to tail.

# Usage

This crate is `flitmesh`. To use it add `flitmesh` to your dependencies in
your project's `Cargo.toml`.

```toml
[dependencies]
flitmesh = "0.1"
```

# Configuration Syntax

Components are described by `ConfigurationValue` objects: the object name
selects the builder and the fields carry the parameters. The builders for
routings and routers can be extended with custom ones through [Plugs]. A
whole simulation is a `Configuration` object:

```ignore
Configuration
{
	mesh_dim_x: 3,
	mesh_dim_y: 3,
	buffer_depth: 4,//flits available in each input buffer
	cycles: 1000,//Simulated cycles.
	warm_up_time: 0,//Flits created before this cycle are not measured.
	random_seed: 42,//Each router derives its own generator from it.
	max_volume_to_be_drained: 0,//0 is unlimited; otherwise stop after so many drained flits.
	dyad_threshold: 0.6,//Fraction of a neighbour buffer that counts as congestion.
	routing: XY { },//Or WestFirst, NorthLast, NegativeFirst, OddEven, Dyad, Table.
	selection: Random { },//Or BufferLevel, NoP.
	router: Wormhole { },
	//radio_hubs: [[0,1,2],[6,7,8]],//Optional: nodes attached to each radio hub.
}
```

Parsing a textual configuration grammar into `ConfigurationValue` is the job
of the embedding application; this library receives the built values, which
is also how its own test-suite drives it.

# Concurrency model

The simulation is cycle-accurate discrete-event. Within a tick every router
and endpoint sees the signal values committed in the previous tick; all the
writes of a tick become visible at the next one (see the `network` module).
Traffic generation and consumption beyond the endpoint protocol, the radio
hub internals, and routing-table construction are external collaborators.

*/

pub mod config;
pub mod error;
pub mod topology;
pub mod matrix;
pub mod buffer;
pub mod reservation;
pub mod router;
pub mod routing;
pub mod selection;
pub mod stats;
pub mod network;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use config::ConfigurationValue;
use buffer::DEFAULT_DEADLOCK_TIMEOUT;
use network::Network;
use router::{Router,RouterBuilderArgument};
use routing::{Routing,RoutingBuilderArgument,GlobalRoutingTable};
use selection::Selection;
use topology::{MeshData,DIRECTIONS};

///An amount of cycles.
pub type Time = u64;

///The role of a flit inside its packet. A packet is a head, any number of
///bodies, and a tail.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum FlitType
{
	Head,
	Body,
	Tail,
}

///The data word carried by a flit.
#[derive(Clone,Copy,Debug,Default,PartialEq,Eq)]
pub struct Payload
{
	pub data: u32,
}

impl Payload
{
	pub fn from_bytes(bytes:[u8;4]) -> Payload
	{
		Payload{ data: bytemuck::cast(bytes) }
	}
	pub fn to_bytes(self) -> [u8;4]
	{
		bytemuck::cast(self.data)
	}
}

///The unit moved across one link in one handshake. Head flits carry the
///routable header; bodies and the tail ride the reservation the head made.
#[derive(Clone,Debug)]
pub struct Flit
{
	pub src_id: usize,
	pub dst_id: usize,
	pub flit_type: FlitType,
	///Position inside the packet.
	pub sequence_no: u32,
	pub payload: Payload,
	///Cycle at which the flit was created.
	pub timestamp: Time,
	///Router-to-router hops taken so far.
	pub hop_no: u32,
}

///What a router knows about one output channel of a neighbour.
#[derive(Clone,Copy,Debug,Default)]
pub struct ChannelStatus
{
	pub free_slots: usize,
	pub available: bool,
}

///The record a router broadcasts to its cardinal neighbours for the
///neighbours-on-path selection: its own availability and its latest view of
///the buffers around it.
#[derive(Clone,Debug,Default)]
pub struct NoPData
{
	///`None` while nothing has been received on the wire yet.
	pub sender_id: Option<usize>,
	pub channel_status_neighbor: [ChannelStatus;DIRECTIONS],
}

///The global read-only parameters of a simulation.
#[derive(Debug)]
pub struct Configuration
{
	pub mesh_dim_x: usize,
	pub mesh_dim_y: usize,
	pub buffer_depth: usize,
	///Cycle budget of `Simulation::run`.
	pub cycles: Time,
	pub warm_up_time: Time,
	pub random_seed: u64,
	///Stop the simulation once so many flits were drained. 0 is unlimited.
	pub max_volume_to_be_drained: usize,
	///Fraction of a neighbour buffer that must be occupied to report
	///congestion.
	pub dyad_threshold: f64,
	pub deadlock_timeout: Time,
	pub use_winoc: bool,
	///Radio hub of each node, if any.
	pub radio_hubs: Vec<Option<usize>>,
	pub routing_cv: ConfigurationValue,
	pub selection_cv: ConfigurationValue,
	pub router_cv: ConfigurationValue,
}

impl Configuration
{
	pub fn new(cv:&ConfigurationValue) -> Configuration
	{
		let mut mesh_dim_x = None;
		let mut mesh_dim_y = None;
		let mut buffer_depth = None;
		let mut cycles: Time = 0;
		let mut warm_up_time: Time = 0;
		let mut random_seed: u64 = 1;
		let mut max_volume_to_be_drained: usize = 0;
		let mut dyad_threshold: f64 = 0.6;
		let mut deadlock_timeout: Time = DEFAULT_DEADLOCK_TIMEOUT;
		let mut use_winoc: Option<bool> = None;
		let mut radio_hub_groups: Vec<Vec<usize>> = vec![];
		let mut routing_cv = ConfigurationValue::Object("XY".to_string(),vec![]);
		let mut selection_cv = ConfigurationValue::Object("Random".to_string(),vec![]);
		let mut router_cv = ConfigurationValue::Object("Wormhole".to_string(),vec![]);
		match_object_panic!(cv,"Configuration",value,
			"mesh_dim_x" => mesh_dim_x = Some(value.as_usize().expect("bad mesh_dim_x")),
			"mesh_dim_y" => mesh_dim_y = Some(value.as_usize().expect("bad mesh_dim_y")),
			"buffer_depth" => buffer_depth = Some(value.as_usize().expect("bad buffer_depth")),
			"cycles" => cycles = value.as_time().expect("bad cycles"),
			"warm_up_time" => warm_up_time = value.as_time().expect("bad warm_up_time"),
			"random_seed" => random_seed = value.as_usize().expect("bad random_seed") as u64,
			"max_volume_to_be_drained" => max_volume_to_be_drained = value.as_usize().expect("bad max_volume_to_be_drained"),
			"dyad_threshold" => dyad_threshold = value.as_f64().expect("bad dyad_threshold"),
			"deadlock_timeout" => deadlock_timeout = value.as_time().expect("bad deadlock_timeout"),
			"use_winoc" => use_winoc = Some(value.as_bool().expect("bad use_winoc")),
			"radio_hubs" => radio_hub_groups = value.as_array().expect("bad radio_hubs").iter().map(
				|group|group.as_array().expect("bad radio_hubs group").iter().map(
					|node|node.as_usize().expect("bad radio_hubs node")).collect()).collect(),
			"routing" => routing_cv = value.clone(),
			"selection" => selection_cv = value.clone(),
			"router" => router_cv = value.clone(),
		);
		let mesh_dim_x = mesh_dim_x.expect("There were no mesh_dim_x");
		let mesh_dim_y = mesh_dim_y.expect("There were no mesh_dim_y");
		let buffer_depth = buffer_depth.expect("There were no buffer_depth");
		let mut radio_hubs = vec![None; mesh_dim_x*mesh_dim_y];
		for (hub,group) in radio_hub_groups.iter().enumerate()
		{
			for &node in group
			{
				radio_hubs[node] = Some(hub);
			}
		}
		let use_winoc = use_winoc.unwrap_or(!radio_hub_groups.is_empty());
		Configuration{
			mesh_dim_x,
			mesh_dim_y,
			buffer_depth,
			cycles,
			warm_up_time,
			random_seed,
			max_volume_to_be_drained,
			dyad_threshold,
			deadlock_timeout,
			use_winoc,
			radio_hubs,
			routing_cv,
			selection_cv,
			router_cv,
		}
	}
	pub fn has_radio_hub(&self, node:usize) -> bool
	{
		self.radio_hubs.get(node).map_or(false,|hub|hub.is_some())
	}
	pub fn same_radio_hub(&self, a:usize, b:usize) -> bool
	{
		match (self.radio_hubs.get(a),self.radio_hubs.get(b))
		{
			(Some(Some(ha)),Some(Some(hb))) => ha==hb,
			_ => false,
		}
	}
}

///The state shared read-only by every router during a tick: the global
///parameters, the clock, the topology and the routing machinery. Mutation
///after simulation start is confined to the tick engine advancing `cycle`.
pub struct SimulationShared
{
	pub cycle: Time,
	pub mesh: MeshData,
	pub configuration: Configuration,
	pub routing: Box<dyn Routing>,
	pub selection: Selection,
}

///The few globals the routers mutate while ticking.
pub struct SimulationMut
{
	///Flits drained over the whole mesh.
	pub drained_volume: usize,
	///Raised when the drain limit is reached; observed at tick boundaries.
	pub stop_requested: bool,
}

///User-provided builders, to employ custom routers or routings from the
///same configuration mechanism.
#[derive(Default)]
pub struct Plugs
{
	pub(crate) routers: BTreeMap<String, fn(RouterBuilderArgument) -> Rc<RefCell<dyn Router>> >,
	pub(crate) routings: BTreeMap<String, fn(RoutingBuilderArgument) -> Box<dyn Routing> >,
}

impl Plugs
{
	pub fn add_router(&mut self, key:String, builder:fn(RouterBuilderArgument) -> Rc<RefCell<dyn Router>>)
	{
		self.routers.insert(key,builder);
	}
	pub fn add_routing(&mut self, key:String, builder:fn(RoutingBuilderArgument) -> Box<dyn Routing>)
	{
		self.routings.insert(key,builder);
	}
}

///A whole simulation: the network plus its cycle budget.
pub struct Simulation
{
	pub network: Network,
}

impl Simulation
{
	pub fn new(cv:&ConfigurationValue, plugs:&Plugs) -> Simulation
	{
		let configuration = Configuration::new(cv);
		Simulation{
			network: Network::new(configuration,plugs,&GlobalRoutingTable::invalid()),
		}
	}
	///Run up to the configured cycle budget, or until a drain limit stops
	///the simulation.
	pub fn run(&mut self)
	{
		let budget = self.network.shared().configuration.cycles;
		while self.network.cycle() < budget && !self.network.stop_requested()
		{
			self.network.step();
		}
	}
	///Aggregate results over the mesh, as a `Result` object.
	pub fn get_simulation_results(&self) -> ConfigurationValue
	{
		let mut routed_flits = 0u64;
		let mut received_flits = 0u64;
		let mut received_packets = 0u64;
		let mut total_delay = 0u64;
		for router in self.network.routers.iter()
		{
			let router = router.borrow();
			routed_flits += router.routed_flits();
			let stats = router.stats();
			received_flits += stats.received_flits();
			received_packets += stats.received_packets();
			total_delay += stats.total_delay();
		}
		let average_flit_delay = if received_flits==0 { 0.0 } else { total_delay as f64 / received_flits as f64 };
		ConfigurationValue::Object("Result".to_string(),vec![
			("cycles".to_string(),ConfigurationValue::Number(self.network.cycle() as f64)),
			("routed_flits".to_string(),ConfigurationValue::Number(routed_flits as f64)),
			("drained_volume".to_string(),ConfigurationValue::Number(self.network.drained_volume() as f64)),
			("received_flits".to_string(),ConfigurationValue::Number(received_flits as f64)),
			("received_packets".to_string(),ConfigurationValue::Number(received_packets as f64)),
			("average_flit_delay".to_string(),ConfigurationValue::Number(average_flit_delay)),
		])
	}
}
