//! Scripted Locomotion Walkthrough
//!
//! Drives a [`CharacterController`] headlessly through a short script:
//! load the four locomotion clips, walk forward, sprint, turn left,
//! stop, dance and settle back into idle. The active state, position and
//! speed are logged as they change.
//!
//! Run with `RUST_LOG=info cargo run --example walkthrough`.

use glam::Vec3;
use strider::animation::{AnimationClip, InMemoryClipSource, TargetPath, Track, TrackData, load_clips};
use strider::animation::tracks::{InterpolationMode, KeyframeTrack};
use strider::fsm::LOCOMOTION_STATES;
use strider::input::{ButtonState, Key};
use strider::{CharacterController, ControllerConfig};

const FRAME: f32 = 1.0 / 60.0;

/// A single hip-bob track so the clips have something to blend.
fn hip_bob(name: &str, duration: f32, height: f32) -> AnimationClip {
    let times = vec![0.0, duration * 0.5, duration];
    let values = vec![Vec3::ZERO, Vec3::new(0.0, height, 0.0), Vec3::ZERO];
    let track = Track {
        node_name: "Hips".to_string(),
        target: TargetPath::Translation,
        data: TrackData::Vector3(KeyframeTrack::new(times, values, InterpolationMode::Linear)),
    };
    AnimationClip::new(name, vec![track])
}

struct Step {
    label: &'static str,
    seconds: f32,
    press: &'static [Key],
    release: &'static [Key],
}

const SCRIPT: &[Step] = &[
    Step { label: "stand", seconds: 0.5, press: &[], release: &[] },
    Step { label: "walk", seconds: 1.5, press: &[Key::W], release: &[] },
    Step { label: "sprint", seconds: 1.5, press: &[Key::ShiftLeft], release: &[] },
    Step { label: "turn", seconds: 0.5, press: &[Key::A], release: &[Key::ShiftLeft] },
    Step { label: "stop", seconds: 1.5, press: &[], release: &[Key::W, Key::A] },
    Step { label: "dance", seconds: 0.1, press: &[Key::Space], release: &[] },
    Step { label: "watch", seconds: 4.0, press: &[], release: &[Key::Space] },
];

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ControllerConfig::from_json_str(r#"{ "max_dt": 0.1 }"#)?;
    let mut controller = CharacterController::new(config)?;

    let mut scene: Vec<&str> = Vec::new();
    controller.attach_avatar(&mut scene, "paladin")?;

    let source = InMemoryClipSource::new()
        .with_clip("idle", hip_bob("idle", 2.0, 0.02))
        .with_clip("walk", hip_bob("walk", 1.0, 0.05))
        .with_clip("run", hip_bob("run", 0.7, 0.1))
        .with_clip("dance", hip_bob("dance", 3.0, 0.3));

    let summary = pollster::block_on(load_clips(&source, &LOCOMOTION_STATES, &controller.load_sink()));
    log::info!("Loaded {} clips ({} failed)", summary.loaded, summary.failed);
    controller.poll_loads();
    anyhow::ensure!(controller.is_ready(), "clips did not finish loading");

    let mut last_state = controller.current_state();
    for step in SCRIPT {
        log::info!("-- {} --", step.label);
        for &key in step.press {
            controller.handle_key(key, ButtonState::Pressed);
        }
        for &key in step.release {
            controller.handle_key(key, ButtonState::Released);
        }

        let frames = (step.seconds / FRAME).round() as usize;
        for _ in 0..frames {
            controller.update(FRAME);

            let state = controller.current_state();
            if state != last_state {
                log::info!("{:?} -> {:?}", last_state.unwrap_or("none"), state.unwrap_or("none"));
                last_state = state;
            }
        }

        let hips = controller
            .evaluate_pose()
            .and_then(|pose| pose.joint("Hips").and_then(|j| j.translation));
        log::info!(
            "position {:.2?}, speed {:.2}, hips {:.3?}",
            controller.position(),
            controller.velocity().z,
            hips.unwrap_or(Vec3::ZERO)
        );
    }

    controller.shutdown();
    Ok(())
}
