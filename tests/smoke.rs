use wildgrove_core::{Seed, SimTick};
use wildgrove_testkit::{EventRecord, JsonlSink};
use wildgrove_world::{MessageKind, World};

#[test]
fn narrative_stream_can_be_written() {
    let path = std::env::temp_dir().join("wildgrove-smoke-eventlog.jsonl");
    let mut sink = JsonlSink::create(&path).expect("can create temp log");

    let mut world = World::generate(Seed::new(2024), 4, 4);
    for _ in 0..500 {
        let messages = world.tick();
        let tick: SimTick = world.clock.tick;
        for message in &messages {
            let kind = match message.kind {
                MessageKind::Narrative => "narrative",
                MessageKind::System => "system",
            };
            sink.write(&EventRecord {
                tick,
                kind,
                payload: &message.text,
            })
            .expect("can write event");
        }
    }

    let written = sink.written();
    assert_eq!(sink.finish().expect("flush"), written);
    std::fs::remove_file(&path).ok();
}
