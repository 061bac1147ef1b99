//! Registration Demo
//!
//! Drives the viewer with a synthetic registration run: a sensor moving
//! around a circular corridor, scanning noisy wall points. Each iteration
//! produces one frame (ego-frame scan, subsampled keypoints, accumulated
//! map, pose) and hands it to the viewer, which blocks until you step or
//! start playback.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use nalgebra::UnitQuaternion;
use rand::Rng;
use regviz_core::{LocalMap, PointCloud, Point3f, Pose, Vector3f};
use regviz_viewer::{BackendKind, RegistrationVisualizer, StubVisualizer, Visualizer};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    Panel,
    Keys,
}

#[derive(Parser)]
#[command(about = "Synthetic registration run through the regviz viewer")]
struct Args {
    /// Rendering backend to use
    #[arg(long, value_enum, default_value = "panel")]
    backend: Backend,

    /// Run headless with the stub visualizer
    #[arg(long)]
    headless: bool,

    /// Number of synthetic frames to produce
    #[arg(long, default_value_t = 500)]
    frames: usize,
}

/// Map storage: accumulated world-frame points, voxel-free for simplicity
struct DemoMap {
    cloud: PointCloud<Point3f>,
}

impl LocalMap for DemoMap {
    fn point_cloud(&self) -> PointCloud<Point3f> {
        self.cloud.clone()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut viewer: Box<dyn Visualizer> = if args.headless {
        Box::new(StubVisualizer)
    } else {
        let kind = match args.backend {
            Backend::Panel => BackendKind::Panel,
            Backend::Keys => BackendKind::Keys,
        };
        Box::new(RegistrationVisualizer::new(kind))
    };

    let mut rng = rand::thread_rng();
    let mut map = DemoMap {
        cloud: PointCloud::new(),
    };

    let corridor_radius = 20.0_f32;
    let corridor_width = 4.0_f32;

    for i in 0..args.frames {
        let angle = i as f32 * 0.02;
        let pose = sensor_pose(corridor_radius, angle);

        // Scan the corridor walls around the current position, in world
        // coordinates, then pull the scan into the ego frame.
        let mut source = PointCloud::with_capacity(600);
        let inverse = pose.inverse();
        for _ in 0..600 {
            let along = angle + rng.gen_range(-0.15..0.15);
            let wall = if rng.gen_bool(0.5) {
                corridor_radius - corridor_width / 2.0
            } else {
                corridor_radius + corridor_width / 2.0
            };
            let world = Point3f::new(
                wall * along.cos() + rng.gen_range(-0.05..0.05),
                rng.gen_range(0.0..2.5),
                wall * along.sin() + rng.gen_range(-0.05..0.05),
            );
            source.push(inverse.transform_point(&world));
        }

        let keypoints: PointCloud<Point3f> =
            source.iter().step_by(10).copied().collect();

        viewer.update(&source, &keypoints, &map, &pose);

        // Integrate the frame into the map after visualization, the way a
        // pipeline would: the map handed to frame N is built from 0..N-1.
        map.cloud
            .extend(source.iter().step_by(5).map(|p| pose.transform_point(p)));
    }

    println!("Demo finished after {} frames", args.frames);
    Ok(())
}

fn sensor_pose(radius: f32, angle: f32) -> Pose {
    let position = Vector3f::new(radius * angle.cos(), 1.0, radius * angle.sin());
    let heading = UnitQuaternion::from_euler_angles(0.0, -angle, 0.0);
    Pose::from_parts(position, heading)
}
