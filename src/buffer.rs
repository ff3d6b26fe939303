/*!

The bounded FIFO attached to each input port of a router.

A buffer admits at most one flit per cycle (enforced by the receive process)
and hands its front flit to the forwarding phase. Buffers at the mesh
boundary are disabled at configure time: a disabled buffer reports itself
full and silently refuses admissions, so the boundary ports never take part
in the switch.

The buffer also carries a deadlock watchdog: the age of the current head
flit, in cycles. The watchdog is advisory, it only feeds a log warning.

*/

use std::collections::VecDeque;
use std::io::{self,Write};

use crate::Flit;
use crate::Time;

///Cycles a head flit may stall before the watchdog complains.
pub const DEFAULT_DEADLOCK_TIMEOUT: Time = 4000;

#[derive(Clone,Debug,Default)]
struct BufferStats
{
	max_occupancy: usize,
	accumulated_occupancy: u64,
	pushes: u64,
}

///Bounded FIFO of flits with an enable flag and a head-age watchdog.
#[derive(Clone,Debug)]
pub struct InputBuffer
{
	queue: VecDeque<Flit>,
	max_buffer_size: usize,
	enabled: bool,
	deadlock_timeout: Time,
	///Cycle at which the current head flit reached the front, if any.
	head_since: Option<Time>,
	stats: BufferStats,
}

impl InputBuffer
{
	pub fn new(max_buffer_size:usize) -> InputBuffer
	{
		InputBuffer{
			queue: VecDeque::with_capacity(max_buffer_size),
			max_buffer_size,
			enabled: true,
			deadlock_timeout: DEFAULT_DEADLOCK_TIMEOUT,
			head_since: None,
			stats: BufferStats::default(),
		}
	}
	///Store a flit. Admissions into a disabled buffer fail silently;
	///pushing into a full buffer is a protocol violation.
	pub fn push(&mut self, flit:Flit, cycle:Time)
	{
		if !self.enabled
		{
			return;
		}
		if self.queue.len() >= self.max_buffer_size
		{
			panic!("pushing into a full buffer");
		}
		if self.queue.is_empty()
		{
			self.head_since = Some(cycle);
		}
		self.queue.push_back(flit);
		let occupancy = self.queue.len();
		if occupancy > self.stats.max_occupancy
		{
			self.stats.max_occupancy = occupancy;
		}
		self.stats.accumulated_occupancy += occupancy as u64;
		self.stats.pushes += 1;
	}
	pub fn front(&self) -> Option<&Flit>
	{
		self.queue.front()
	}
	///Extract the front flit. The head age restarts for the next flit.
	pub fn pop(&mut self, cycle:Time) -> Flit
	{
		let flit = self.queue.pop_front().expect("popping from an empty buffer");
		self.head_since = if self.queue.is_empty() { None } else { Some(cycle) };
		flit
	}
	pub fn size(&self) -> usize
	{
		self.queue.len()
	}
	pub fn is_empty(&self) -> bool
	{
		self.queue.is_empty()
	}
	///Whether an admission would fail. Disabled buffers are always full.
	pub fn is_full(&self) -> bool
	{
		!self.enabled || self.queue.len() >= self.max_buffer_size
	}
	///Slots still admittable. Disabled buffers have none.
	pub fn free_slots(&self) -> usize
	{
		if self.enabled
		{
			self.max_buffer_size - self.queue.len()
		}
		else
		{
			0
		}
	}
	pub fn max_buffer_size(&self) -> usize
	{
		self.max_buffer_size
	}
	///Whether the buffer is healthy. Returns false when the head flit has
	///been waiting longer than the watchdog timeout.
	pub fn check_deadlock(&self, cycle:Time) -> bool
	{
		match self.head_since
		{
			Some(since) => cycle.saturating_sub(since) <= self.deadlock_timeout,
			None => true,
		}
	}
	pub fn disable(&mut self)
	{
		self.enabled = false;
	}
	pub fn is_enabled(&self) -> bool
	{
		self.enabled
	}
	pub fn set_capacity(&mut self, max_buffer_size:usize)
	{
		self.max_buffer_size = max_buffer_size;
	}
	pub fn set_deadlock_timeout(&mut self, deadlock_timeout:Time)
	{
		self.deadlock_timeout = deadlock_timeout;
	}
	pub fn show_stats(&self, out:&mut dyn Write, port:usize) -> io::Result<()>
	{
		let mean = if self.stats.pushes==0 { 0.0 } else { self.stats.accumulated_occupancy as f64 / self.stats.pushes as f64 };
		writeln!(out,"\tbuffer[{}] enabled={} occupancy: max={} mean={:.2}",port,self.enabled,self.stats.max_occupancy,mean)
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::{Flit,FlitType,Payload};

	fn flit(sequence_no:u32) -> Flit
	{
		Flit{
			src_id: 0,
			dst_id: 1,
			flit_type: FlitType::Body,
			sequence_no,
			payload: Payload::default(),
			timestamp: 0,
			hop_no: 0,
		}
	}

	#[test]
	fn fifo_order_and_capacity()
	{
		let mut buffer = InputBuffer::new(2);
		assert!(buffer.is_empty());
		buffer.push(flit(0),0);
		buffer.push(flit(1),0);
		assert!(buffer.is_full());
		assert_eq!(buffer.free_slots(),0);
		assert_eq!(buffer.pop(1).sequence_no,0);
		assert_eq!(buffer.free_slots(),1);
		assert_eq!(buffer.pop(1).sequence_no,1);
		assert!(buffer.is_empty());
	}
	#[test]
	fn disabled_buffer_admits_nothing()
	{
		let mut buffer = InputBuffer::new(4);
		assert!(buffer.is_enabled());
		buffer.disable();
		assert!(!buffer.is_enabled());
		assert!(buffer.is_full());
		assert_eq!(buffer.free_slots(),0);
		buffer.push(flit(0),0);
		assert_eq!(buffer.size(),0);
	}
	#[test]
	fn watchdog_complains_after_timeout()
	{
		let mut buffer = InputBuffer::new(4);
		buffer.set_deadlock_timeout(10);
		buffer.push(flit(0),5);
		assert!(buffer.check_deadlock(15));
		assert!(!buffer.check_deadlock(16));
		//Progress restarts the head age.
		buffer.push(flit(1),16);
		buffer.pop(16);
		assert!(buffer.check_deadlock(26));
	}
	#[test]
	#[should_panic]
	fn overfilling_is_fatal()
	{
		let mut buffer = InputBuffer::new(1);
		buffer.push(flit(0),0);
		buffer.push(flit(1),0);
	}
}
