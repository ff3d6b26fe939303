/*!

A `Router` moves flits between its input buffers and its output links, one
tick at a time.

The wire-level contract is the [LinkSample] bundle: everything one end of a
link publishes during a tick and the other end latches at the start of the
next tick. The tick engine (see the `network` module) performs that copy in
its propagation phase, so within a tick a router only reads its own latches
and only writes its own registers, which realizes the delta-cycle semantics
of the signal wires.

see [`new_router`](fn.new_router.html) for the builder.

*/

pub mod wormhole;

use std::cell::RefCell;
use std::fmt::Debug;
use std::io::{self,Write};
use std::rc::Rc;

use crate::config::ConfigurationValue;
use crate::routing::GlobalRoutingTable;
use crate::stats::Stats;
use crate::{NoPData,Flit,Plugs,SimulationShared,SimulationMut,Time};
use self::wormhole::Wormhole;

///The values one side of a link publishes on its wires: the data flit and
///its request level, the acknowledge level of the receive side, and the
///telemetry (free slots of the facing buffer, neighbours-on-path record).
#[derive(Clone,Debug,Default)]
pub struct LinkSample
{
	pub flit: Option<Flit>,
	pub req: bool,
	pub ack: bool,
	pub free_slots: usize,
	pub nop: NoPData,
}

///The per-router interface the tick engine drives every cycle.
pub trait Router : Debug
{
	///Assign the identity and apply the global parameters. Cardinal buffers
	///at the mesh boundary get disabled here.
	fn configure(&mut self, shared:&SimulationShared, local_id:usize, warm_up_time:Time, max_buffer_size:usize, routing_table:&GlobalRoutingTable);
	///Synchronous reset: clear the protocol levels and counters and publish
	///maximum free slots.
	fn reset(&mut self);
	///The receive process: admit at most one flit per input port.
	fn rx_process(&mut self, shared:&SimulationShared);
	///The transmit process: reserve outputs for head flits, then forward
	///under the reservations.
	fn tx_process(&mut self, shared:&SimulationShared, mutable:&mut SimulationMut);
	///Publish the flow-control telemetry for the adaptive selections.
	fn buffer_monitor(&mut self, shared:&SimulationShared);
	///Read the outbound wires of a port, to be latched by the peer.
	fn sample_outputs(&self, port:usize) -> LinkSample;
	///Latch the peer's outbound wires into this port.
	fn drive_inputs(&mut self, port:usize, sample:LinkSample);
	///Flits forwarded from a non-local input.
	fn routed_flits(&self) -> u64;
	///Flits currently sitting in the input buffers.
	fn flits_count(&self) -> usize;
	///Accumulated energy of the switch activities.
	fn power(&self) -> f64;
	///Whether some cardinal neighbour is past the congestion threshold.
	fn in_congestion(&self, shared:&SimulationShared) -> bool;
	///Log the last neighbours-on-path records received.
	fn nop_report(&self);
	fn show_buffers_stats(&self, out:&mut dyn Write) -> io::Result<()>;
	fn stats(&self) -> &Stats;
	///Flits drained at this router's local port.
	fn local_drained(&self) -> u64;
}

///The argument of a builder function for `Router`s.
pub struct RouterBuilderArgument<'a>
{
	///A ConfigurationValue::Object defining the router.
	pub cv: &'a ConfigurationValue,
	///The user defined plugs. In case the router needs to create elements.
	pub plugs: &'a Plugs,
	///Master seed of the simulation; each router derives its own generator
	///from it at configure time.
	pub seed: u64,
}

///Build a new router. `Wormhole { }` is the input-buffered wormhole switch.
pub fn new_router(arg:RouterBuilderArgument) -> Rc<RefCell<dyn Router>>
{
	if let &ConfigurationValue::Object(ref cv_name, ref _cv_pairs) = arg.cv
	{
		if let Some(builder) = arg.plugs.routers.get(cv_name)
		{
			return builder(arg);
		}
		match cv_name.as_ref()
		{
			"Wormhole" => Rc::new(RefCell::new(Wormhole::new(arg))),
			_ => panic!("Unknown Router {}",cv_name),
		}
	}
	else
	{
		panic!("Trying to create a Router from a non-Object");
	}
}
