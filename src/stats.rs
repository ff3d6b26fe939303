/*!

Per-router statistics: reception accounting at the local port and the power
event counters.

The power model is an event-count model: each switch activity contributes a
fixed energy quantum. Calibrating the quanta against a physical model is out
of the scope of the core; the hooks record where the energy goes.

*/

use std::collections::BTreeMap;

use crate::Flit;
use crate::FlitType;
use crate::Time;

//Energy quanta, in arbitrary units.
const ENERGY_BUFFERING: f64 = 0.4;
const ENERGY_ROUTING: f64 = 0.3;
const ENERGY_SELECTION: f64 = 0.05;
const ENERGY_CROSSBAR: f64 = 0.7;
const ENERGY_LINK: f64 = 1.5;
const ENERGY_LEAKAGE: f64 = 0.01;
const ENERGY_END_TO_END: f64 = 0.2;

///Accumulated energy per switch activity.
#[derive(Clone,Debug,Default)]
pub struct PowerMonitor
{
	buffering: f64,
	routing: f64,
	selection: f64,
	crossbar: f64,
	link: f64,
	leakage: f64,
	end_to_end: f64,
}

impl PowerMonitor
{
	pub fn buffering(&mut self)
	{
		self.buffering += ENERGY_BUFFERING;
	}
	pub fn routing(&mut self)
	{
		self.routing += ENERGY_ROUTING;
	}
	pub fn selection(&mut self)
	{
		self.selection += ENERGY_SELECTION;
	}
	pub fn crossbar(&mut self)
	{
		self.crossbar += ENERGY_CROSSBAR;
	}
	pub fn link(&mut self)
	{
		self.link += ENERGY_LINK;
	}
	pub fn leakage(&mut self)
	{
		self.leakage += ENERGY_LEAKAGE;
	}
	pub fn end_to_end(&mut self)
	{
		self.end_to_end += ENERGY_END_TO_END;
	}
	pub fn total_power(&self) -> f64
	{
		self.buffering + self.routing + self.selection + self.crossbar + self.link + self.leakage + self.end_to_end
	}
}

///Reception accounting for one source.
#[derive(Clone,Debug,Default)]
pub struct CommunicationStats
{
	pub received_flits: u64,
	pub received_packets: u64,
	///Sum over received flits of `cycle - timestamp`.
	pub total_delay: u64,
	pub last_received_flit_cycle: Time,
}

///The statistics block of one router.
#[derive(Clone,Debug,Default)]
pub struct Stats
{
	local_id: usize,
	warm_up_time: Time,
	pub power: PowerMonitor,
	total: CommunicationStats,
	per_source: BTreeMap<usize,CommunicationStats>,
}

impl Stats
{
	pub fn configure(&mut self, local_id:usize, warm_up_time:Time)
	{
		self.local_id = local_id;
		self.warm_up_time = warm_up_time;
		self.total = CommunicationStats::default();
		self.per_source.clear();
	}
	///Account a flit ejected at the local port. Flits created during the
	///warm-up window are not measured.
	pub fn received_flit(&mut self, cycle:Time, flit:&Flit)
	{
		if flit.timestamp < self.warm_up_time
		{
			return;
		}
		let delay = cycle.saturating_sub(flit.timestamp);
		let is_tail = flit.flit_type == FlitType::Tail;
		for entry in [&mut self.total, self.per_source.entry(flit.src_id).or_default()]
		{
			entry.received_flits += 1;
			entry.total_delay += delay;
			entry.last_received_flit_cycle = cycle;
			if is_tail
			{
				entry.received_packets += 1;
			}
		}
	}
	pub fn received_flits(&self) -> u64
	{
		self.total.received_flits
	}
	pub fn received_packets(&self) -> u64
	{
		self.total.received_packets
	}
	///Sum of `cycle - timestamp` over all measured receptions.
	pub fn total_delay(&self) -> u64
	{
		self.total.total_delay
	}
	pub fn average_delay(&self) -> f64
	{
		if self.total.received_flits == 0
		{
			0.0
		}
		else
		{
			self.total.total_delay as f64 / self.total.received_flits as f64
		}
	}
	pub fn last_received_flit_cycle(&self) -> Time
	{
		self.total.last_received_flit_cycle
	}
	pub fn communication_from(&self, source:usize) -> Option<&CommunicationStats>
	{
		self.per_source.get(&source)
	}
}
