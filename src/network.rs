/*!

The instantiated mesh: all the routers, the processing-element endpoints at
their local ports, and the tick engine.

Every tick has two phases. The propagation phase copies, for every link,
the outbound registers committed in the previous tick into the peer's
inbound latches. The evaluation phase then runs every endpoint and every
router; they read only their own latches and write only their own
registers, so evaluation order is immaterial and all inter-router
communication is delayed by exactly one tick. This is the double-buffered
realization of the hardware signal wires.

*/

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::router::{Router,RouterBuilderArgument,new_router,LinkSample};
use crate::routing::{new_routing,RoutingBuilderArgument,GlobalRoutingTable};
use crate::selection::{new_selection,SelectionBuilderArgument};
use crate::topology::{Direction,MeshData};
use crate::{Configuration,Flit,FlitType,Payload,Plugs,SimulationShared,SimulationMut,Time};

///The device at the local port of a router: the network side of a
///processing element. It follows the same alternating-bit protocol as a
///neighbouring router, injects whatever packets were queued on it, and
///consumes the flits ejected at its node, unless the sink is stalled.
#[derive(Debug)]
pub struct LocalEndpoint
{
	node: usize,
	packet_count: u32,
	current_level_tx: bool,
	current_level_rx: bool,
	//Outbound registers toward the router's local port.
	out_flit: Option<Flit>,
	out_req: bool,
	out_ack: bool,
	//Inbound latches from the router.
	in_flit: Option<Flit>,
	in_req: bool,
	in_ack: bool,
	pending: VecDeque<Flit>,
	received: Vec<Flit>,
	injected_flits: u64,
	sink_stalled: bool,
}

impl LocalEndpoint
{
	fn new(node:usize) -> LocalEndpoint
	{
		LocalEndpoint{
			node,
			packet_count: 0,
			current_level_tx: false,
			current_level_rx: false,
			out_flit: None,
			out_req: false,
			out_ack: false,
			in_flit: None,
			in_req: false,
			in_ack: false,
			pending: VecDeque::new(),
			received: Vec::new(),
			injected_flits: 0,
			sink_stalled: false,
		}
	}
	///Queue a whole packet of `size` flits (head, bodies, tail) towards
	///`destination`. The flits are pushed onto the link as the router acks.
	pub fn queue_packet(&mut self, destination:usize, size:usize, cycle:Time)
	{
		assert!(size >= 2, "a packet is at least a head and a tail");
		let packet_id = self.packet_count;
		self.packet_count += 1;
		for index in 0..size
		{
			let flit_type = if index == 0
			{
				FlitType::Head
			}
			else if index == size-1
			{
				FlitType::Tail
			}
			else
			{
				FlitType::Body
			};
			self.pending.push_back(Flit{
				src_id: self.node,
				dst_id: destination,
				flit_type,
				sequence_no: index as u32,
				payload: Payload::from_bytes(bytemuck::cast([packet_id as u16, index as u16])),
				timestamp: cycle,
				hop_no: 0,
			});
		}
	}
	fn process(&mut self, _cycle:Time)
	{
		//Consume an ejected flit, unless the sink is stalled.
		if self.in_req != self.current_level_rx && !self.sink_stalled
		{
			let flit = self.in_flit.clone().expect("request toggled with no flit on the wire");
			self.current_level_rx = !self.current_level_rx;
			self.received.push(flit);
		}
		self.out_ack = self.current_level_rx;
		//Inject the next pending flit once the router acknowledged the
		//previous one.
		if self.current_level_tx == self.in_ack
		{
			if let Some(flit) = self.pending.pop_front()
			{
				self.out_flit = Some(flit);
				self.current_level_tx = !self.current_level_tx;
				self.out_req = self.current_level_tx;
				self.injected_flits += 1;
			}
		}
	}
	fn sample_outputs(&self) -> LinkSample
	{
		LinkSample{
			flit: self.out_flit.clone(),
			req: self.out_req,
			ack: self.out_ack,
			free_slots: 0,
			nop: Default::default(),
		}
	}
	fn drive_inputs(&mut self, sample:LinkSample)
	{
		self.in_flit = sample.flit;
		self.in_req = sample.req;
		self.in_ack = sample.ack;
	}
	///The flits consumed at this node, in arrival order.
	pub fn received(&self) -> &[Flit]
	{
		&self.received
	}
	///Flits queued but not yet pushed onto the link.
	pub fn pending_count(&self) -> usize
	{
		self.pending.len()
	}
	pub fn injected_flits(&self) -> u64
	{
		self.injected_flits
	}
	///While stalled the sink stops acknowledging, so ejections at this node
	///back-pressure into the mesh.
	pub fn set_sink_stalled(&mut self, stalled:bool)
	{
		self.sink_stalled = stalled;
	}
	pub fn node(&self) -> usize
	{
		self.node
	}
}

///All the routers of the mesh plus their endpoints and wiring.
pub struct Network
{
	shared: SimulationShared,
	mutable: SimulationMut,
	///The collection of all the routers in the network.
	pub routers: Vec<Rc<RefCell<dyn Router>>>,
	///One processing-element endpoint per node.
	pub endpoints: Vec<LocalEndpoint>,
}

impl Network
{
	pub fn new(configuration:Configuration, plugs:&Plugs, routing_table:&GlobalRoutingTable) -> Network
	{
		let mesh = MeshData::new(configuration.mesh_dim_x,configuration.mesh_dim_y);
		let routing = new_routing(RoutingBuilderArgument{ cv: &configuration.routing_cv, plugs });
		let selection = new_selection(SelectionBuilderArgument{ cv: &configuration.selection_cv, plugs });
		let shared = SimulationShared{
			cycle: 0,
			mesh,
			routing,
			selection,
			configuration,
		};
		let num_routers = shared.mesh.num_routers();
		let mut routers = Vec::with_capacity(num_routers);
		let mut endpoints = Vec::with_capacity(num_routers);
		for id in 0..num_routers
		{
			let router = new_router(RouterBuilderArgument{
				cv: &shared.configuration.router_cv,
				plugs,
				seed: shared.configuration.random_seed,
			});
			router.borrow_mut().configure(&shared,id,shared.configuration.warm_up_time,shared.configuration.buffer_depth,routing_table);
			router.borrow_mut().reset();
			routers.push(router);
			endpoints.push(LocalEndpoint::new(id));
		}
		Network{
			shared,
			mutable: SimulationMut{ drained_volume: 0, stop_requested: false },
			routers,
			endpoints,
		}
	}

	///Copy every committed outbound register into the peer latch it feeds.
	///Outputs are only read and latches only written, so the order of the
	///copies does not matter.
	fn propagate(&mut self)
	{
		let local = Direction::Local.index();
		for id in 0..self.routers.len()
		{
			for direction in Direction::CARDINALS.iter()
			{
				if let Some(neighbour) = self.shared.mesh.neighbour_id(id,*direction)
				{
					let sample = self.routers[neighbour].borrow().sample_outputs(direction.reflex().index());
					self.routers[id].borrow_mut().drive_inputs(direction.index(),sample);
				}
			}
			let from_endpoint = self.endpoints[id].sample_outputs();
			let to_endpoint = self.routers[id].borrow().sample_outputs(local);
			self.routers[id].borrow_mut().drive_inputs(local,from_endpoint);
			self.endpoints[id].drive_inputs(to_endpoint);
		}
	}

	///Advance the whole mesh one cycle.
	pub fn step(&mut self)
	{
		self.propagate();
		for endpoint in self.endpoints.iter_mut()
		{
			endpoint.process(self.shared.cycle);
		}
		for router in self.routers.iter()
		{
			let mut router = router.borrow_mut();
			router.rx_process(&self.shared);
			router.tx_process(&self.shared,&mut self.mutable);
			router.buffer_monitor(&self.shared);
		}
		self.shared.cycle += 1;
	}

	///Step up to `cycles` times, stopping early if a drain limit fires.
	pub fn run_for(&mut self, cycles:Time)
	{
		for _ in 0..cycles
		{
			if self.mutable.stop_requested
			{
				break;
			}
			self.step();
		}
	}

	pub fn cycle(&self) -> Time
	{
		self.shared.cycle
	}
	pub fn stop_requested(&self) -> bool
	{
		self.mutable.stop_requested
	}
	///Flits drained over the whole mesh.
	pub fn drained_volume(&self) -> usize
	{
		self.mutable.drained_volume
	}
	pub fn shared(&self) -> &SimulationShared
	{
		&self.shared
	}
	pub fn router(&self, id:usize) -> Rc<RefCell<dyn Router>>
	{
		self.routers[id].clone()
	}
	pub fn endpoint(&self, id:usize) -> &LocalEndpoint
	{
		&self.endpoints[id]
	}
	pub fn endpoint_mut(&mut self, id:usize) -> &mut LocalEndpoint
	{
		&mut self.endpoints[id]
	}
	///Queue a packet on the source endpoint, stamped with the current cycle.
	pub fn queue_packet(&mut self, source:usize, destination:usize, size:usize)
	{
		let cycle = self.shared.cycle;
		self.endpoints[source].queue_packet(destination,size,cycle);
	}
	///Drive the inbound latches of an unwired port, such as the hub port.
	///Latches persist across ticks until overwritten, so an external
	///collaborator can participate in the flow control from outside.
	pub fn drive_router_inputs(&mut self, router:usize, port:usize, sample:LinkSample)
	{
		self.routers[router].borrow_mut().drive_inputs(port,sample);
	}
	pub fn sample_router_outputs(&self, router:usize, port:usize) -> LinkSample
	{
		self.routers[router].borrow().sample_outputs(port)
	}
}
