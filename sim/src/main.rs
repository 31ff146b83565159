mod clock;
mod constants;
mod hand_script;
mod room_layout;
mod world;

use log::{error, info, warn};
use rand::{SeedableRng, rngs::StdRng};
use shared::{
    FrameOutcome, HandPose, Origin, RainConfig, RainPipeline, RoomGeometry, SpawnOutcome,
};

use crate::{
    clock::FixedStepClock,
    constants::{CUBE_HALF_EXTENT, FRAME_HZ, RNG_SEED, SIM_DURATION_S},
    hand_script::{ScriptedHand, default_timeline},
    room_layout::default_room,
    world::{SessionMode, SimWorld},
};

/// Participant that receives authority over a handed-off object.
const REMOTE_PARTICIPANT: u32 = 1;

type SimPipeline = RainPipeline<HandPose, RoomGeometry, SimWorld, StdRng>;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let room = match RoomGeometry::build(default_room()) {
        Ok(room) => room,
        Err(e) => {
            error!("failed to build room: {e}");
            std::process::exit(1);
        }
    };

    let config = RainConfig::default();
    if let Err(reason) = config.validate() {
        warn!("configuration problem: {reason}");
    }

    let world = SimWorld::new(SessionMode::Shared { participants: 2 }, CUBE_HALF_EXTENT);
    let mut pipeline: SimPipeline = RainPipeline::new(
        config,
        None,
        room,
        world,
        StdRng::seed_from_u64(RNG_SEED),
    );

    info!(
        "session {:?}, room with {} surfaces",
        pipeline.authority().mode(),
        pipeline.surface().surface_count()
    );

    let summary = run(&mut pipeline, ScriptedHand::new(default_timeline()));
    info!(
        "done: {} spawns, {} live in queue, {} objects in world, {} contact steps",
        summary.spawns,
        pipeline.spawner().live_count(),
        pipeline.authority().object_count(),
        summary.contact_steps
    );
}

#[derive(Debug, Default)]
struct RunSummary {
    spawns: usize,
    contact_steps: usize,
}

fn run(pipeline: &mut SimPipeline, hand: ScriptedHand) -> RunSummary {
    let frame_dt = 1.0 / FRAME_HZ;
    let frames = (SIM_DURATION_S * FRAME_HZ) as u32;
    let mut clock = FixedStepClock::default();
    let mut summary = RunSummary::default();
    let mut handed_off = false;

    for frame in 0..frames {
        let t = pipeline.elapsed_s() as f32 + frame_dt;
        pipeline.set_hand(Some(hand.pose_at(t)));

        if let FrameOutcome::Triggered(SpawnOutcome::Spawned { handle, origin, .. }) =
            pipeline.tick(frame_dt)
        {
            summary.spawns += 1;

            // Give the second replicated object to the other participant, so eviction
            // has to skip it.
            if !handed_off && origin == Origin::Replicated && summary.spawns == 2 {
                handed_off = pipeline
                    .authority_mut()
                    .transfer_authority(handle, REMOTE_PARTICIPANT);
            }
        }

        for _ in 0..clock.advance(frame_dt) {
            let dt = clock.fixed_dt_s();
            pipeline.authority_mut().step(dt);
            if pipeline.fixed_tick(dt) > 0 {
                summary.contact_steps += 1;
            }
        }

        if frame % FRAME_HZ as u32 == 0 {
            let status = pipeline.status();
            info!(
                "t={:.1}s surface={} hand={} gesture={} trigger={:?} live={}/{} shared={}",
                status.elapsed_s,
                status.surface,
                status.spawner.hand_tracked,
                status.spawner.gesture_active,
                status.spawner.trigger,
                status.spawner.live_count,
                status.spawner.max_objects,
                status.shared_session
            );
        }
    }

    summary
}
