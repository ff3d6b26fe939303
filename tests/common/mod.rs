use flitmesh::config::ConfigurationValue;

/*
	Auxiliary functions to create the configuration values for the tests.
*/

///Parameters of a mesh simulation. Build the `Configuration` object with
///[create_configuration].
pub struct ConfigurationBuilder
{
	pub mesh_dim_x: usize,
	pub mesh_dim_y: usize,
	pub buffer_depth: usize,
	pub cycles: u64,
	pub routing: ConfigurationValue,
	pub selection: ConfigurationValue,
	///Extra fields appended verbatim, e.g. `max_volume_to_be_drained`.
	pub extra: Vec<(String,ConfigurationValue)>,
}

impl ConfigurationBuilder
{
	///A 3x3 mesh with XY routing and random selection, the base of most
	///scenarios.
	pub fn base() -> ConfigurationBuilder
	{
		ConfigurationBuilder{
			mesh_dim_x: 3,
			mesh_dim_y: 3,
			buffer_depth: 4,
			cycles: 100,
			routing: create_routing("XY"),
			selection: create_selection("Random"),
			extra: vec![],
		}
	}
}

///Creates a Configuration Value for a routing without parameters.
pub fn create_routing(name:&str) -> ConfigurationValue
{
	ConfigurationValue::Object(name.to_string(),vec![])
}

///Creates a Configuration Value for a selection policy.
pub fn create_selection(name:&str) -> ConfigurationValue
{
	ConfigurationValue::Object(name.to_string(),vec![])
}

///Creates the whole Configuration Value of a simulation.
pub fn create_configuration(arg:ConfigurationBuilder) -> ConfigurationValue
{
	let mut fields = vec![
		("mesh_dim_x".to_string(),ConfigurationValue::Number(arg.mesh_dim_x as f64)),
		("mesh_dim_y".to_string(),ConfigurationValue::Number(arg.mesh_dim_y as f64)),
		("buffer_depth".to_string(),ConfigurationValue::Number(arg.buffer_depth as f64)),
		("cycles".to_string(),ConfigurationValue::Number(arg.cycles as f64)),
		("random_seed".to_string(),ConfigurationValue::Number(42.0)),
		("routing".to_string(),arg.routing),
		("selection".to_string(),arg.selection),
		("router".to_string(),ConfigurationValue::Object("Wormhole".to_string(),vec![])),
	];
	fields.extend(arg.extra);
	ConfigurationValue::Object("Configuration".to_string(),fields)
}
