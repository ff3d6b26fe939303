mod common;
use common::*;
use flitmesh::*;
use flitmesh::network::Network;
use flitmesh::router::{Router,RouterBuilderArgument,LinkSample};
use flitmesh::router::wormhole::Wormhole;
use flitmesh::routing::{new_routing,RoutingBuilderArgument,GlobalRoutingTable};
use flitmesh::selection::Selection;
use flitmesh::topology::{Direction,MeshData};
use flitmesh::config::ConfigurationValue;

fn make_shared(buffer_depth:usize) -> SimulationShared
{
	let mut builder = ConfigurationBuilder::base();
	builder.buffer_depth = buffer_depth;
	let configuration = Configuration::new(&create_configuration(builder));
	let plugs = Plugs::default();
	let routing_cv = configuration.routing_cv.clone();
	SimulationShared{
		cycle: 0,
		mesh: MeshData::new(configuration.mesh_dim_x,configuration.mesh_dim_y),
		routing: new_routing(RoutingBuilderArgument{ cv: &routing_cv, plugs: &plugs }),
		selection: Selection::Random,
		configuration,
	}
}

fn body_flit(sequence_no:u32) -> Flit
{
	Flit{
		src_id: 5,
		dst_id: 4,
		flit_type: FlitType::Body,
		sequence_no,
		payload: Payload::default(),
		timestamp: 0,
		hop_no: 0,
	}
}

//Scenario: toggle the request line every other tick with the buffer never
//full. Every toggle must yield exactly one admission and the published
//acknowledge must mirror the admitted level.
#[test]
fn alternating_bit_admission()
{
	let plugs = Plugs::default();
	let router_cv = ConfigurationValue::Object("Wormhole".to_string(),vec![]);
	let mut router = Wormhole::new(RouterBuilderArgument{ cv: &router_cv, plugs: &plugs, seed: 7 });
	let mut shared = make_shared(8);
	//Node 4 sits in the middle of the mesh, so no buffer is disabled.
	router.configure(&shared,4,0,8,&GlobalRoutingTable::invalid());
	router.reset();
	let east = Direction::East.index();
	let mut level = false;
	let mut expected = 0;
	for tick in 0..12
	{
		if tick % 2 == 0
		{
			level = !level;
			expected += 1;
		}
		router.drive_inputs(east,LinkSample{
			flit: Some(body_flit(tick)),
			req: level,
			ack: false,
			free_slots: 8,
			nop: Default::default(),
		});
		router.rx_process(&shared);
		assert_eq!(router.flits_count(),expected,"admissions at tick {}",tick);
		assert_eq!(router.sample_outputs(east).ack,level,"acknowledge at tick {}",tick);
		shared.cycle += 1;
	}
}

//At the mesh corner (0,0) the north and west buffers are disabled: they
//admit nothing and never acknowledge.
#[test]
fn disabled_boundary_ports_admit_nothing()
{
	let plugs = Plugs::default();
	let router_cv = ConfigurationValue::Object("Wormhole".to_string(),vec![]);
	let mut router = Wormhole::new(RouterBuilderArgument{ cv: &router_cv, plugs: &plugs, seed: 7 });
	let mut shared = make_shared(4);
	router.configure(&shared,0,0,4,&GlobalRoutingTable::invalid());
	router.reset();
	let mut level = false;
	for tick in 0..8
	{
		level = !level;
		for port in [Direction::North.index(),Direction::West.index()].iter()
		{
			router.drive_inputs(*port,LinkSample{
				flit: Some(body_flit(tick)),
				req: level,
				ack: false,
				free_slots: 4,
				nop: Default::default(),
			});
		}
		router.rx_process(&shared);
		assert_eq!(router.flits_count(),0);
		assert_eq!(router.sample_outputs(Direction::North.index()).ack,false);
		assert_eq!(router.sample_outputs(Direction::West.index()).ack,false);
		shared.cycle += 1;
	}
	//The east port of the same router admits normally.
	router.drive_inputs(Direction::East.index(),LinkSample{
		flit: Some(body_flit(100)),
		req: true,
		ack: false,
		free_slots: 4,
		nop: Default::default(),
	});
	router.rx_process(&shared);
	assert_eq!(router.flits_count(),1);
}

//Scenario: a long packet towards a stalled consumer. The buffers along the
//path fill up, admissions pause at the source, and everything drains once
//the consumer resumes.
#[test]
fn backpressure_fills_buffers_and_recovers()
{
	let plugs = Plugs::default();
	let mut builder = ConfigurationBuilder::base();
	builder.buffer_depth = 2;
	//BufferLevel keeps the telemetry flowing, which inCongestion reads.
	builder.selection = create_selection("BufferLevel");
	let configuration = Configuration::new(&create_configuration(builder));
	let mut network = Network::new(configuration,&plugs,&GlobalRoutingTable::invalid());
	assert!(!network.router(5).borrow().in_congestion(network.shared()));
	network.endpoint_mut(8).set_sink_stalled(true);
	network.queue_packet(0,8,18);
	network.run_for(80);
	//Path 0->1->2->5->8. Each hop holds two buffered flits plus one flit
	//waiting unacknowledged on the wire; the head waits on the local wire
	//of node 8.
	for &id in [0usize,1,2,5,8].iter()
	{
		assert_eq!(network.router(id).borrow().flits_count(),2,"buffer of router {}",id);
	}
	assert_eq!(network.endpoint(0).injected_flits(),16);
	assert_eq!(network.endpoint(0).pending_count(),2);
	assert_eq!(network.endpoint(8).received().len(),0);
	//The head was already forwarded to the local port, hence counted.
	assert_eq!(network.drained_volume(),1);
	//Node 8's full buffer shows up as congestion at its upstream router.
	assert!(network.router(5).borrow().in_congestion(network.shared()));
	network.router(5).borrow().nop_report();
	let mut out = Vec::new();
	network.router(5).borrow().show_buffers_stats(&mut out).unwrap();
	assert!(!out.is_empty());
	//Resume the consumer and let everything drain.
	network.endpoint_mut(8).set_sink_stalled(false);
	network.run_for(100);
	let received = network.endpoint(8).received().to_vec();
	assert_eq!(received.len(),18);
	assert!(received.iter().enumerate().all(|(index,flit)|flit.sequence_no==index as u32));
	assert_eq!(network.drained_volume(),18);
	assert_eq!(network.endpoint(0).pending_count(),0);
	for id in 0..9
	{
		assert_eq!(network.router(id).borrow().flits_count(),0);
	}
}

//The hub port follows the same alternating-bit contract as any other
//output; an external collaborator can take the flits by acknowledging.
#[test]
fn hub_port_obeys_flow_control()
{
	let plugs = Plugs::default();
	let mut builder = ConfigurationBuilder::base();
	builder.extra.push(("radio_hubs".to_string(),ConfigurationValue::Array(vec![
		ConfigurationValue::Array(vec![ConfigurationValue::Number(0.0)]),
		ConfigurationValue::Array(vec![ConfigurationValue::Number(8.0)]),
	])));
	let configuration = Configuration::new(&create_configuration(builder));
	assert!(configuration.use_winoc);
	assert!(configuration.has_radio_hub(0) && configuration.has_radio_hub(8));
	assert!(!configuration.same_radio_hub(0,8));
	let mut network = Network::new(configuration,&plugs,&GlobalRoutingTable::invalid());
	network.queue_packet(0,8,3);
	let hub = Direction::Hub.index();
	let mut my_level = false;
	let mut taken: Vec<Flit> = vec![];
	for _ in 0..40
	{
		network.step();
		let sample = network.sample_router_outputs(0,hub);
		if sample.req != my_level
		{
			taken.push(sample.flit.clone().expect("request raised with no flit on the hub wire"));
			my_level = !my_level;
			network.drive_router_inputs(0,hub,LinkSample{
				flit: None,
				req: false,
				ack: my_level,
				free_slots: 4,
				nop: Default::default(),
			});
		}
		if taken.len() == 3
		{
			break;
		}
	}
	assert_eq!(taken.len(),3);
	assert_eq!(taken[0].flit_type,FlitType::Head);
	assert_eq!(taken[1].flit_type,FlitType::Body);
	assert_eq!(taken[2].flit_type,FlitType::Tail);
	assert!(taken.iter().all(|flit|flit.dst_id==8));
	//The whole packet left through the hub, nothing remains buffered.
	assert_eq!(network.router(0).borrow().flits_count(),0);
	assert_eq!(network.router(0).borrow().routed_flits(),0);
}
