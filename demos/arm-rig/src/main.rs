//! Headless tour of the bundled skinning scenes: bends each rig through a
//! sweep of elbow angles and reports what would have been drawn.

use armature::{rendering::RecordingContext, scenes::Scene, ArmatureResult};
use log::info;

const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;

fn main() {
    env_logger::init();
    real_main().expect("Error running demo!");
}

fn real_main() -> ArmatureResult<()> {
    run_scene("rigid cylinder", Scene::rigid_cylinder()?)?;
    run_scene("linear cylinder", Scene::linear_cylinder()?)?;
    run_scene("linear arm", Scene::linear_arm()?)?;
    Ok(())
}

fn run_scene(name: &str, mut scene: Scene) -> ArmatureResult<()> {
    info!(
        "{name}: {} joints, {} vertices",
        scene.skeleton().borrow().joint_count(),
        scene.skin().rest_positions().len()
    );

    // Inspect the forearm's weights while the elbow sweeps.
    scene.show_joint_weights(1)?;

    let mut ctx = RecordingContext::default();
    for frame in 0..=6 {
        let elbow = frame as f32 * 15.0;
        scene.set_joint_angle(0, elbow * 0.25)?;
        scene.set_joint_angle(1, elbow)?;

        ctx.clear();
        scene.render(&mut ctx, WIDTH, HEIGHT);

        let tip = scene
            .skin()
            .deformed_positions()
            .last()
            .copied()
            .unwrap_or_default();
        info!(
            "{name} frame {frame}: elbow {elbow:.0} deg, {} triangle draws, {} line draws, tip at ({:.2}, {:.2}, {:.2})",
            ctx.triangles.len(),
            ctx.lines.len(),
            tip.x,
            tip.y,
            tip.z
        );
    }

    Ok(())
}
