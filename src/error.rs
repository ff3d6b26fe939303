/*!

The `Error` type returned by the fallible operations of the crate.

Errors are built with the [error!] macro, which captures the source location
of the construction site. Configuration mistakes are considered fatal and the
builders panic instead (see `match_object_panic!`); the `Error` type covers
the paths where the caller may sensibly react, such as the typed accessors of
`ConfigurationValue` or a `Routing` refusing a request.

*/

use std::fmt::{self,Display,Formatter};

use crate::config::ConfigurationValue;

///The point of the crate sources where an `Error` was created.
#[derive(Debug,Clone,Copy)]
pub struct SourceLocation
{
	pub file: &'static str,
	pub line: u32,
}

impl Display for SourceLocation
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		write!(f,"{}:{}",self.file,self.line)
	}
}

///Capture the current source location. Used by the `error!` macro.
#[macro_export]
macro_rules! source_location{
	() => {{
		$crate::error::SourceLocation{ file: file!(), line: line!() }
	}};
}

///Build an `Error` of the given kind, capturing the source location.
///`error!(bad_argument)`, `error!(ill_formed_configuration,cv)`.
#[macro_export]
macro_rules! error{
	(ill_formed_configuration, $cv:expr) => {{
		$crate::error::Error::new($crate::source_location!(),$crate::error::ErrorKind::IllFormedConfiguration($cv))
	}};
	(bad_argument) => {{
		$crate::error::Error::new($crate::source_location!(),$crate::error::ErrorKind::BadArgument)
	}};
	(no_candidates) => {{
		$crate::error::Error::new($crate::source_location!(),$crate::error::ErrorKind::NoCandidates)
	}};
}

#[derive(Debug)]
pub enum ErrorKind
{
	///A `ConfigurationValue` did not have the shape required at its point of use.
	IllFormedConfiguration(ConfigurationValue),
	///Some argument was out of domain.
	BadArgument,
	///A routing found no candidate direction to offer.
	NoCandidates,
}

#[derive(Debug)]
pub struct Error
{
	pub source_location: SourceLocation,
	pub kind: ErrorKind,
	pub message: Option<String>,
}

impl Error
{
	pub fn new(source_location:SourceLocation, kind:ErrorKind) -> Error
	{
		Error{ source_location, kind, message: None }
	}
	///Attach a human-oriented explanation to the error.
	pub fn with_message(mut self, message:String) -> Error
	{
		self.message = Some(message);
		self
	}
}

impl Display for Error
{
	fn fmt(&self, f: &mut Formatter) -> fmt::Result
	{
		write!(f,"Error at {}: {:?}",self.source_location,self.kind)?;
		if let Some(ref message) = self.message
		{
			write!(f," ({})",message)?;
		}
		Ok(())
	}
}

impl std::error::Error for Error {}
