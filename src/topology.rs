/*!

Geometry of the 2D mesh: the fixed port enumeration of a router, router
identifiers and their coordinates, and neighbourhood queries.

Routers sit on a `dim_x` times `dim_y` grid. Row 0 is the NORTH edge and
column 0 is the WEST edge, so going NORTH decreases `y` and going WEST
decreases `x`. The identifier of the router at `(x,y)` is `x + y*dim_x`.

*/

use std::fmt::{self,Display,Formatter};

///Number of cardinal directions of the mesh.
pub const DIRECTIONS: usize = 4;
///Ports of a router: the four cardinals plus the local port and the radio hub port.
pub const PORTS: usize = DIRECTIONS + 2;

///One of the ports of a router. The discriminants are the port indices used
///all over the switch: buffers, reservations, and signal bundles are indexed
///by them.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash)]
#[repr(usize)]
pub enum Direction
{
	North = 0,
	East = 1,
	South = 2,
	West = 3,
	Local = 4,
	Hub = 5,
}

impl Direction
{
	///The four cardinal directions in index order.
	pub const CARDINALS: [Direction;DIRECTIONS] = [Direction::North,Direction::East,Direction::South,Direction::West];
	pub fn index(self) -> usize
	{
		self as usize
	}
	pub fn from_index(index:usize) -> Direction
	{
		match index
		{
			0 => Direction::North,
			1 => Direction::East,
			2 => Direction::South,
			3 => Direction::West,
			4 => Direction::Local,
			5 => Direction::Hub,
			_ => panic!("There is no direction with index {}",index),
		}
	}
	pub fn is_cardinal(self) -> bool
	{
		self.index() < DIRECTIONS
	}
	///The direction one would arrive from if one departed in this direction.
	///Only defined for the cardinals.
	pub fn reflex(self) -> Direction
	{
		match self
		{
			Direction::North => Direction::South,
			Direction::South => Direction::North,
			Direction::East => Direction::West,
			Direction::West => Direction::East,
			_ => panic!("reflex of non-cardinal direction {:?}",self),
		}
	}
}

impl Display for Direction
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		let name = match self
		{
			Direction::North => "North",
			Direction::East => "East",
			Direction::South => "South",
			Direction::West => "West",
			Direction::Local => "Local",
			Direction::Hub => "Hub",
		};
		write!(f,"{}",name)
	}
}

///Position of a router in the mesh.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct Coord
{
	pub x: usize,
	pub y: usize,
}

///The dimensions of the mesh and the derived identifier arithmetic.
#[derive(Clone,Debug)]
pub struct MeshData
{
	pub dim_x: usize,
	pub dim_y: usize,
}

impl MeshData
{
	pub fn new(dim_x:usize, dim_y:usize) -> MeshData
	{
		if dim_x==0 || dim_y==0
		{
			panic!("A mesh cannot have a zero dimension ({}x{})",dim_x,dim_y);
		}
		MeshData{ dim_x, dim_y }
	}
	pub fn num_routers(&self) -> usize
	{
		self.dim_x * self.dim_y
	}
	pub fn id_to_coord(&self, id:usize) -> Coord
	{
		Coord{ x: id % self.dim_x, y: id / self.dim_x }
	}
	pub fn coord_to_id(&self, coord:Coord) -> usize
	{
		coord.x + coord.y*self.dim_x
	}
	///The identifier of the router adjacent to `id` in the given cardinal
	///direction, or `None` past the mesh edge. Callers must treat `None` as
	///"no such neighbour".
	pub fn neighbour_id(&self, id:usize, direction:Direction) -> Option<usize>
	{
		let mut coord = self.id_to_coord(id);
		match direction
		{
			Direction::North =>
			{
				if coord.y == 0 { return None; }
				coord.y -= 1;
			},
			Direction::South =>
			{
				if coord.y == self.dim_y-1 { return None; }
				coord.y += 1;
			},
			Direction::East =>
			{
				if coord.x == self.dim_x-1 { return None; }
				coord.x += 1;
			},
			Direction::West =>
			{
				if coord.x == 0 { return None; }
				coord.x -= 1;
			},
			_ => panic!("neighbour_id of non-cardinal direction {:?}",direction),
		}
		Some(self.coord_to_id(coord))
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	#[test]
	fn reflex_is_an_involution()
	{
		for &d in Direction::CARDINALS.iter()
		{
			assert_eq!(d.reflex().reflex(), d);
		}
	}
	#[test]
	fn coord_round_trip()
	{
		let mesh = MeshData::new(3,4);
		for id in 0..mesh.num_routers()
		{
			assert_eq!(mesh.coord_to_id(mesh.id_to_coord(id)), id);
		}
		assert_eq!(mesh.id_to_coord(5), Coord{x:2,y:1});
	}
	#[test]
	fn edges_have_no_neighbour()
	{
		let mesh = MeshData::new(3,3);
		assert_eq!(mesh.neighbour_id(0,Direction::North), None);
		assert_eq!(mesh.neighbour_id(0,Direction::West), None);
		assert_eq!(mesh.neighbour_id(0,Direction::East), Some(1));
		assert_eq!(mesh.neighbour_id(0,Direction::South), Some(3));
		assert_eq!(mesh.neighbour_id(8,Direction::South), None);
		assert_eq!(mesh.neighbour_id(8,Direction::East), None);
		assert_eq!(mesh.neighbour_id(4,Direction::North), Some(1));
	}
}
