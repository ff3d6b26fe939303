/*!

The `ConfigurationValue` object model from which every pluggable component of
the simulator is built.

A component is described by an `Object` whose name selects the builder (see
`new_routing`, `new_selection`, `new_router`) and whose fields carry the
parameters. Values are built programmatically; parsing a textual
configuration grammar into this model is left to the embedding application.

*/

use crate::error::Error;
use crate::error;

///A configuration entry. Objects are typed `Name { key1: value1, ... }`,
///arrays `[value1, value2, ...]`.
#[derive(Clone,Debug,PartialEq)]
pub enum ConfigurationValue
{
	Literal(String),
	Number(f64),
	Object(String,Vec<(String,ConfigurationValue)>),
	Array(Vec<ConfigurationValue>),
	True,
	False,
	None,
}

///Compare a `ConfigurationValue` against an object name, iterating its fields
///through the given match arms and panicking on unknown fields. This is how
///component builders consume their configuration; a mistake in the
///configuration is fatal.
#[macro_export]
macro_rules! match_object_panic{
	($cv:expr, $name:literal, $valueid:ident ) => {{
		match_object_panic!($cv,$name,$valueid,)
	}};
	($cv:expr, $name:literal, $valueid:ident, $($arm:tt)* ) => {{
		if let &$crate::config::ConfigurationValue::Object(ref cv_name, ref cv_pairs) = $cv
		{
			if cv_name != $name
			{
				panic!("A {} must be created from a `{}` object not `{}`",$name,$name,cv_name);
			}
			for &(ref name,ref $valueid) in cv_pairs
			{
				match AsRef::<str>::as_ref(&name)
				{
					$( $arm )*
					"legend_name" => (),
					_ => panic!("Nothing to do with field {} in {}",name,$name),
				}
			}
		}
		else
		{
			panic!("Trying to create a {} from a non-Object",$name);
		}
	}};
}

impl ConfigurationValue
{
	pub fn as_bool(&self) -> Result<bool,Error>
	{
		match self
		{
			&ConfigurationValue::True => Ok(true),
			&ConfigurationValue::False => Ok(false),
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	pub fn as_str(&self) -> Result<&str,Error>
	{
		match self
		{
			&ConfigurationValue::Literal(ref s) => Ok(s),
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	pub fn as_f64(&self) -> Result<f64,Error>
	{
		match self
		{
			&ConfigurationValue::Number(x) => Ok(x),
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	pub fn as_usize(&self) -> Result<usize,Error>
	{
		match self
		{
			&ConfigurationValue::Number(x) =>{
				let res = x as usize;
				//Casting from a float to an integer rounds towards zero.
				//We reject values that were not close to an integer to begin with.
				let y = res as f64;
				let tolerance = 1e-5;
				if x-y > tolerance || x-y < -tolerance {
					Err(error!(ill_formed_configuration, self.clone()))
				} else {
					Ok( res )
				}
			},
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	pub fn as_time(&self) -> Result<crate::Time,Error>
	{
		self.as_usize().map(|x|x as crate::Time)
	}
	pub fn as_array(&self) -> Result<&Vec<ConfigurationValue>,Error>
	{
		match self
		{
			&ConfigurationValue::Array(ref a) => Ok(a),
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
	///The name when the value is an `Object`.
	pub fn as_object_name(&self) -> Result<&str,Error>
	{
		match self
		{
			&ConfigurationValue::Object(ref name,_) => Ok(name),
			_ => Err(error!(ill_formed_configuration, self.clone() )),
		}
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	#[test]
	fn accessors()
	{
		assert_eq!(ConfigurationValue::Number(3.0).as_usize().unwrap(), 3);
		assert!(ConfigurationValue::Number(3.5).as_usize().is_err());
		assert_eq!(ConfigurationValue::True.as_bool().unwrap(), true);
		assert!(ConfigurationValue::Literal("x".to_string()).as_f64().is_err());
		let obj = ConfigurationValue::Object("Thing".to_string(),vec![]);
		assert_eq!(obj.as_object_name().unwrap(), "Thing");
	}
	#[test]
	#[should_panic]
	fn wrong_object_name()
	{
		let cv = ConfigurationValue::Object("Other".to_string(),vec![]);
		match_object_panic!(&cv,"Thing",_value);
	}
}
