/*!

The input-buffered wormhole switch.

Each cycle runs two processes. The receive process admits at most one flit
per input port under the alternating-bit handshake. The transmit process
first lets head flits at the buffer fronts reserve output ports, walking the
ports round-robin from a rotating start for fairness, and then forwards the
fronts of the buffers that own a reservation, releasing it when the tail
goes through. Only a head can acquire a reservation and body/tail flits only
move under the reservation of their input, so the flits of a packet never
interleave with another packet on an output.

*/

use std::io::{self,Write};

use ::rand::{rngs::StdRng,SeedableRng};
use log::{debug,info,warn};

use crate::match_object_panic;
use crate::buffer::InputBuffer;
use crate::reservation::ReservationTable;
use crate::router::{Router,RouterBuilderArgument,LinkSample};
use crate::routing::{RouteData,RouterView,GlobalRoutingTable};
use crate::routing::table::RoutingTable;
use crate::selection::SelectionContext;
use crate::stats::Stats;
use crate::topology::{Direction,DIRECTIONS,PORTS};
use crate::{ChannelStatus,Flit,FlitType,NoPData,SimulationShared,SimulationMut,Time};

///The wormhole router of the mesh. State is owned exclusively by the
///router; the only shared medium are the latched link wires.
#[derive(Debug)]
pub struct Wormhole
{
	local_id: usize,
	///Input port where the next reservation sweep begins.
	start_from_port: usize,
	buffers: Vec<InputBuffer>,
	reservation_table: ReservationTable,
	///Table slice applied at configure time, for the `Table` routing.
	routing_table: RoutingTable,
	current_level_rx: [bool;PORTS],
	current_level_tx: [bool;PORTS],
	//Outbound registers, sampled by the peers at the next propagation.
	flit_tx: Vec<Option<Flit>>,
	req_tx: [bool;PORTS],
	ack_rx: [bool;PORTS],
	free_slots: [usize;PORTS],
	nop_data_out: [NoPData;DIRECTIONS],
	//Inbound latches, written by the propagation phase.
	flit_rx: Vec<Option<Flit>>,
	req_rx: [bool;PORTS],
	ack_tx: [bool;PORTS],
	free_slots_neighbor: [usize;PORTS],
	nop_data_in: [NoPData;DIRECTIONS],
	routed_flits: u64,
	local_drained: u64,
	stats: Stats,
	seed: u64,
	rng: StdRng,
}

impl Wormhole
{
	pub fn new(arg:RouterBuilderArgument) -> Wormhole
	{
		match_object_panic!(arg.cv,"Wormhole",_value);
		Wormhole{
			local_id: 0,
			start_from_port: Direction::Local.index(),
			buffers: (0..PORTS).map(|_|InputBuffer::new(1)).collect(),
			reservation_table: ReservationTable::new(),
			routing_table: RoutingTable::invalid(),
			current_level_rx: [false;PORTS],
			current_level_tx: [false;PORTS],
			flit_tx: vec![None;PORTS],
			req_tx: [false;PORTS],
			ack_rx: [false;PORTS],
			free_slots: [0;PORTS],
			nop_data_out: Default::default(),
			flit_rx: vec![None;PORTS],
			req_rx: [false;PORTS],
			ack_tx: [false;PORTS],
			free_slots_neighbor: [0;PORTS],
			nop_data_in: Default::default(),
			routed_flits: 0,
			local_drained: 0,
			stats: Stats::default(),
			seed: arg.seed,
			rng: StdRng::seed_from_u64(arg.seed),
		}
	}

	///Routing decision for a head flit: local ejection when the packet is
	///home, the radio hub when source and destination lie under different
	///hubs, otherwise the configured algorithm plus selection.
	fn route(&mut self, shared:&SimulationShared, data:&RouteData) -> Direction
	{
		self.stats.power.routing();
		if data.dst_id == self.local_id
		{
			return Direction::Local;
		}
		let candidates = self.routing_function(shared,data);
		if candidates.len() == 1
		{
			return candidates[0];
		}
		self.stats.power.selection();
		let in_congestion = self.congested_neighbourhood(shared);
		let view = RouterView{
			local_id: self.local_id,
			mesh: &shared.mesh,
			routing_table: &self.routing_table,
			in_congestion,
		};
		let mut context = SelectionContext{
			view: &view,
			routing: shared.routing.as_ref(),
			reservations: &self.reservation_table,
			free_slots_neighbor: &self.free_slots_neighbor,
			nop_status: &self.nop_data_in,
			rng: &mut self.rng,
		};
		match shared.selection.select(&mut context,&candidates,data)
		{
			Ok(direction) => direction,
			Err(e) => panic!("selection failed at router {}: {}",self.local_id,e),
		}
	}

	fn routing_function(&self, shared:&SimulationShared, data:&RouteData) -> Vec<Direction>
	{
		if shared.configuration.use_winoc
			&& shared.configuration.has_radio_hub(self.local_id)
			&& shared.configuration.has_radio_hub(data.dst_id)
			&& !shared.configuration.same_radio_hub(self.local_id,data.dst_id)
		{
			debug!("router {} takes the hub towards node {}",self.local_id,data.dst_id);
			return vec![Direction::Hub];
		}
		let view = RouterView{
			local_id: self.local_id,
			mesh: &shared.mesh,
			routing_table: &self.routing_table,
			in_congestion: self.congested_neighbourhood(shared),
		};
		match shared.routing.route(&view,data)
		{
			Ok(candidates) =>
			{
				if candidates.is_empty()
				{
					panic!("the routing returned no candidates at router {} for destination {}",self.local_id,data.dst_id);
				}
				candidates
			},
			Err(e) => panic!("routing failed at router {}: {}",self.local_id,e),
		}
	}

	fn congested_neighbourhood(&self, shared:&SimulationShared) -> bool
	{
		let depth = shared.configuration.buffer_depth;
		for direction in Direction::CARDINALS.iter()
		{
			if shared.mesh.neighbour_id(self.local_id,*direction).is_none()
			{
				continue;
			}
			let free = self.free_slots_neighbor[direction.index()].min(depth);
			let occupied = depth - free;
			if occupied as f64 > depth as f64 * shared.configuration.dyad_threshold
			{
				return true;
			}
		}
		false
	}

	fn current_nop_data(&self) -> NoPData
	{
		let mut channel_status_neighbor = [ChannelStatus::default();DIRECTIONS];
		for direction in Direction::CARDINALS.iter()
		{
			let j = direction.index();
			channel_status_neighbor[j] = ChannelStatus{
				free_slots: self.free_slots_neighbor[j],
				available: self.reservation_table.is_available(j),
			};
		}
		NoPData{
			sender_id: Some(self.local_id),
			channel_status_neighbor,
		}
	}
}

impl Router for Wormhole
{
	fn configure(&mut self, shared:&SimulationShared, local_id:usize, warm_up_time:Time, max_buffer_size:usize, routing_table:&GlobalRoutingTable)
	{
		self.local_id = local_id;
		self.stats.configure(local_id,warm_up_time);
		self.start_from_port = Direction::Local.index();
		self.rng = StdRng::seed_from_u64(self.seed.wrapping_add(local_id as u64));
		if routing_table.is_valid()
		{
			self.routing_table.configure(routing_table,local_id);
		}
		for buffer in self.buffers.iter_mut()
		{
			buffer.set_capacity(max_buffer_size);
			buffer.set_deadlock_timeout(shared.configuration.deadlock_timeout);
		}
		//Until the first published telemetry arrives, assume the neighbour
		//buffers are empty.
		self.free_slots_neighbor = [max_buffer_size;PORTS];
		let coord = shared.mesh.id_to_coord(local_id);
		if coord.y == 0
		{
			self.buffers[Direction::North.index()].disable();
		}
		if coord.y == shared.mesh.dim_y-1
		{
			self.buffers[Direction::South.index()].disable();
		}
		if coord.x == 0
		{
			self.buffers[Direction::West.index()].disable();
		}
		if coord.x == shared.mesh.dim_x-1
		{
			self.buffers[Direction::East.index()].disable();
		}
	}

	fn reset(&mut self)
	{
		for i in 0..PORTS
		{
			self.req_tx[i] = false;
			self.ack_rx[i] = false;
			self.current_level_rx[i] = false;
			self.current_level_tx[i] = false;
		}
		self.routed_flits = 0;
		self.local_drained = 0;
		for i in 0..DIRECTIONS+1
		{
			self.free_slots[i] = self.buffers[i].max_buffer_size();
		}
	}

	fn rx_process(&mut self, shared:&SimulationShared)
	{
		//All arbitration and wormhole issues belong to the transmit process;
		//here each port just decides whether the incoming flit fits.
		for i in 0..PORTS
		{
			if self.req_rx[i] != self.current_level_rx[i] && !self.buffers[i].is_full()
			{
				let flit = self.flit_rx[i].clone().expect("request toggled with no flit on the wire");
				debug!("router {} input[{}] received flit {}/{} of {}->{}",self.local_id,i,flit.sequence_no,flit.hop_no,flit.src_id,flit.dst_id);
				let from_local_source = flit.src_id == self.local_id;
				self.buffers[i].push(flit,shared.cycle);
				self.current_level_rx[i] = !self.current_level_rx[i];
				self.stats.power.buffering();
				if from_local_source
				{
					self.stats.power.end_to_end();
				}
			}
			self.ack_rx[i] = self.current_level_rx[i];
		}
		self.stats.power.leakage();
	}

	fn tx_process(&mut self, shared:&SimulationShared, mutable:&mut SimulationMut)
	{
		//1st phase: reservation.
		for j in 0..PORTS
		{
			let i = (self.start_from_port + j) % PORTS;
			if !self.buffers[i].check_deadlock(shared.cycle)
			{
				warn!("router {} suspects a deadlock on buffer {}",self.local_id,i);
			}
			let front = match self.buffers[i].front()
			{
				Some(flit) => flit.clone(),
				None => continue,
			};
			if front.flit_type == FlitType::Head
			{
				let data = RouteData{
					current_id: self.local_id,
					src_id: front.src_id,
					dst_id: front.dst_id,
					dir_in: Direction::from_index(i),
				};
				let o = self.route(shared,&data).index();
				if self.reservation_table.is_available(o)
				{
					self.stats.power.crossbar();
					self.reservation_table.reserve(i,o);
					debug!("router {} input[{}] ({} flits) reserved output[{}]",self.local_id,i,self.buffers[i].size(),o);
				}
			}
		}
		self.start_from_port = (self.start_from_port + 1) % PORTS;

		//2nd phase: forwarding. Only fronts owning a reservation move; a
		//head owns one exactly when phase 1 just granted it.
		for i in 0..PORTS
		{
			if self.buffers[i].is_empty()
			{
				continue;
			}
			let o = match self.reservation_table.get_output_port(i)
			{
				Some(o) => o,
				None => continue,
			};
			if self.current_level_tx[o] == self.ack_tx[o]
			{
				let mut flit = self.buffers[i].pop(shared.cycle);
				debug!("router {} input[{}] forwards to output[{}] flit {} of {}->{}",self.local_id,i,o,flit.sequence_no,flit.src_id,flit.dst_id);
				if o != Direction::Local.index()
				{
					flit.hop_no += 1;
				}
				self.current_level_tx[o] = !self.current_level_tx[o];
				self.req_tx[o] = self.current_level_tx[o];
				self.stats.power.link();
				if flit.dst_id == self.local_id
				{
					self.stats.power.end_to_end();
				}
				if flit.flit_type == FlitType::Tail
				{
					self.reservation_table.release(o);
				}
				if o == Direction::Local.index()
				{
					self.stats.received_flit(shared.cycle,&flit);
					mutable.drained_volume += 1;
					self.local_drained += 1;
					let limit = shared.configuration.max_volume_to_be_drained;
					if limit != 0 && mutable.drained_volume >= limit
					{
						mutable.stop_requested = true;
					}
				}
				else if i != Direction::Local.index()
				{
					self.routed_flits += 1;
				}
				self.flit_tx[o] = Some(flit);
			}
		}
		self.stats.power.leakage();
	}

	fn buffer_monitor(&mut self, shared:&SimulationShared)
	{
		if !shared.selection.uses_telemetry()
		{
			return;
		}
		//Update the input buffer levels published to the neighbours.
		for i in 0..DIRECTIONS+1
		{
			self.free_slots[i] = self.buffers[i].free_slots();
		}
		//And broadcast this router's view for the NoP selections around.
		let nop = self.current_nop_data();
		for direction in Direction::CARDINALS.iter()
		{
			self.nop_data_out[direction.index()] = nop.clone();
		}
	}

	fn sample_outputs(&self, port:usize) -> LinkSample
	{
		LinkSample{
			flit: self.flit_tx[port].clone(),
			req: self.req_tx[port],
			ack: self.ack_rx[port],
			free_slots: self.free_slots[port],
			nop: if port < DIRECTIONS { self.nop_data_out[port].clone() } else { NoPData::default() },
		}
	}

	fn drive_inputs(&mut self, port:usize, sample:LinkSample)
	{
		self.flit_rx[port] = sample.flit;
		self.req_rx[port] = sample.req;
		self.ack_tx[port] = sample.ack;
		self.free_slots_neighbor[port] = sample.free_slots;
		if port < DIRECTIONS
		{
			self.nop_data_in[port] = sample.nop;
		}
	}

	fn routed_flits(&self) -> u64
	{
		self.routed_flits
	}

	fn flits_count(&self) -> usize
	{
		self.buffers.iter().map(|buffer|buffer.size()).sum()
	}

	fn power(&self) -> f64
	{
		self.stats.power.total_power()
	}

	fn in_congestion(&self, shared:&SimulationShared) -> bool
	{
		self.congested_neighbourhood(shared)
	}

	fn nop_report(&self)
	{
		info!("router {} NoP report:",self.local_id);
		for direction in Direction::CARDINALS.iter()
		{
			let nop = &self.nop_data_in[direction.index()];
			if let Some(sender) = nop.sender_id
			{
				info!("\tfrom node {}: {:?}",sender,nop.channel_status_neighbor);
			}
		}
	}

	fn show_buffers_stats(&self, out:&mut dyn Write) -> io::Result<()>
	{
		writeln!(out,"router {} buffers:",self.local_id)?;
		for (port,buffer) in self.buffers.iter().enumerate()
		{
			buffer.show_stats(out,port)?;
		}
		Ok(())
	}

	fn stats(&self) -> &Stats
	{
		&self.stats
	}

	fn local_drained(&self) -> u64
	{
		self.local_drained
	}
}
