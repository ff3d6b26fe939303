/*!

The reservation table enforcing the wormhole discipline of the switch.

At most one input port owns an output port at a time. The head flit of a
packet acquires the output; body and tail flits ride the same reservation,
and the tail releases it. Double reservation and forwarding through an
unowned output indicate a broken switch and are fatal.

*/

use crate::topology::PORTS;

///Partial mapping from output port to the input port currently owning it.
#[derive(Clone,Debug)]
pub struct ReservationTable
{
	///`owner[output] = Some(input)` while reserved.
	owner: [Option<usize>;PORTS],
}

impl ReservationTable
{
	pub fn new() -> ReservationTable
	{
		ReservationTable{ owner: [None;PORTS] }
	}
	///Whether no input currently reserves the output.
	pub fn is_available(&self, output:usize) -> bool
	{
		self.owner[output].is_none()
	}
	///Grant the output to the input. Reserving a taken output is a protocol
	///violation.
	pub fn reserve(&mut self, input:usize, output:usize)
	{
		if let Some(current) = self.owner[output]
		{
			panic!("output {} is already reserved by input {}",output,current);
		}
		self.owner[output] = Some(input);
	}
	///The output reserved by the input, if any.
	pub fn get_output_port(&self, input:usize) -> Option<usize>
	{
		self.owner.iter().position(|&o|o==Some(input))
	}
	///Clear the reservation of the output. Releasing an unreserved output is
	///a no-op.
	pub fn release(&mut self, output:usize)
	{
		self.owner[output] = None;
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::topology::Direction;

	#[test]
	fn reservation_lifecycle()
	{
		let mut table = ReservationTable::new();
		let east = Direction::East.index();
		let local = Direction::Local.index();
		assert!(table.is_available(east));
		assert_eq!(table.get_output_port(local), None);
		table.reserve(local,east);
		assert!(!table.is_available(east));
		assert_eq!(table.get_output_port(local), Some(east));
		table.release(east);
		assert!(table.is_available(east));
		//Releasing again is harmless.
		table.release(east);
	}
	#[test]
	#[should_panic]
	fn double_reservation_is_fatal()
	{
		let mut table = ReservationTable::new();
		table.reserve(0,1);
		table.reserve(2,1);
	}
}
