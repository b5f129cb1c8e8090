//! Drives the frame loop the way the scenes do, with a CPU-side uniform block
//! standing in for the GPU.

use spinframe::{
    AnimationState, FrameScheduler, FrameStatus, InstanceBatch, Mat4, RenderError, Tick, Transform,
    UniformBlock, UniformLayout, UniformRole, Vec3, compose_model, view_projection,
};

struct Target {
    block: UniformBlock,
    draws: Vec<u64>,
}

impl Target {
    fn new(layout: UniformLayout) -> Self {
        Self {
            block: UniformBlock::new(layout),
            draws: Vec::new(),
        }
    }
}

fn spinning_cube(scheduler: &mut FrameScheduler<Target>, rate: Vec3, id: u64) {
    let vp = view_projection(1.0).view_projection;
    scheduler.start(AnimationState::new(rate), move |target, state| {
        let model = Transform::from_rotation(state.rotation).matrix();
        target.block.write_mat4(UniformRole::Mvp, &(vp * model))?;
        target.draws.push(id);
        Ok(FrameStatus::Presented)
    });
}

#[test]
fn mvp_tracks_accumulated_rotation() {
    let rate = Vec3::new(0.01, 0.02, -0.03);
    let mut scheduler = FrameScheduler::new();
    let mut target = Target::new(UniformLayout::mvp());
    spinning_cube(&mut scheduler, rate, 1);

    for _ in 0..10 {
        scheduler.tick(&mut target).unwrap();
    }

    let expected = view_projection(1.0).view_projection
        * compose_model(Vec3::ZERO, rate * 10.0, Vec3::ONE);
    let written = target.block.read_mat4(UniformRole::Mvp).unwrap();
    assert!(written.abs_diff_eq(expected, 1e-4), "{written:?} vs {expected:?}");
    assert_eq!(scheduler.frames(), 10);
}

#[test]
fn restarting_leaves_a_single_loop_drawing() {
    let mut scheduler = FrameScheduler::new();
    let mut target = Target::new(UniformLayout::mvp());

    spinning_cube(&mut scheduler, Vec3::splat(0.01), 1);
    scheduler.tick(&mut target).unwrap();
    spinning_cube(&mut scheduler, Vec3::splat(0.02), 2);
    for _ in 0..3 {
        scheduler.tick(&mut target).unwrap();
    }

    assert_eq!(target.draws, vec![1, 2, 2, 2]);
    let rotation = scheduler.state().unwrap().rotation;
    assert!(rotation.abs_diff_eq(Vec3::splat(0.06), 1e-6));
}

#[test]
fn static_scene_redraws_the_same_matrix() {
    let mut scheduler = FrameScheduler::new();
    let mut target = Target::new(UniformLayout::mvp());
    spinning_cube(&mut scheduler, Vec3::ZERO, 1);

    scheduler.tick(&mut target).unwrap();
    let first = target.block.read_mat4(UniformRole::Mvp).unwrap();
    for _ in 0..5 {
        scheduler.tick(&mut target).unwrap();
    }

    assert_eq!(target.block.read_mat4(UniformRole::Mvp).unwrap(), first);
    assert_eq!(target.draws.len(), 6);
}

#[test]
fn mismatched_layout_stops_the_loop() {
    let mut scheduler = FrameScheduler::new();
    // No Mvp region: the first write fails and cancels the loop.
    let mut target = Target::new(UniformLayout::fragment_lit());
    spinning_cube(&mut scheduler, Vec3::splat(0.01), 1);

    let err = scheduler.tick(&mut target).unwrap_err();
    assert!(matches!(err, RenderError::UnknownRegion(UniformRole::Mvp)));
    assert!(!scheduler.is_running());
    assert_eq!(scheduler.tick(&mut target).unwrap(), Tick::Idle);
}

#[test]
fn lost_frames_do_not_advance_the_cube() {
    let rate = Vec3::new(0.0, 0.05, 0.0);
    let vp = view_projection(1.0).view_projection;
    let mut scheduler = FrameScheduler::new();
    let mut target = Target::new(UniformLayout::mvp());
    let mut ticks = 0;
    scheduler.start(AnimationState::new(rate), move |target: &mut Target, state: &AnimationState| {
        ticks += 1;
        // Every other surface acquire times out.
        if ticks % 2 == 0 {
            return Ok(FrameStatus::Skipped);
        }
        let model = Transform::from_rotation(state.rotation).matrix();
        target.block.write_mat4(UniformRole::Mvp, &(vp * model))?;
        Ok(FrameStatus::Presented)
    });

    let ticks: Vec<Tick> = (0..4).map(|_| scheduler.tick(&mut target).unwrap()).collect();
    assert_eq!(
        ticks,
        vec![Tick::Drawn { frame: 1 }, Tick::Skipped, Tick::Drawn { frame: 2 }, Tick::Skipped]
    );
    assert_eq!(scheduler.frames(), 2);
    assert!(scheduler.state().unwrap().rotation.abs_diff_eq(rate * 2.0, 1e-6));
}

#[test]
fn grid_packs_every_instance_each_tick() {
    let mut batch = InstanceBatch::new(5, 5, 5);
    let layout = batch.uniform_layout().unwrap();
    assert_eq!(layout.size(), 125 * 64);

    let vp = view_projection(1.0).view_projection;
    let mut scheduler = FrameScheduler::new();
    let mut target = Target::new(layout);
    scheduler.start(AnimationState::default(), move |target: &mut Target, _: &AnimationState| {
        batch.update();
        batch.write_into(&mut target.block, &vp)?;
        target.draws.push(0);
        Ok(FrameStatus::Presented)
    });

    scheduler.tick(&mut target).unwrap();

    let read = |index: u64| -> Mat4 {
        let bytes = target.block.read_range(index * 64, 64).unwrap();
        let floats: [f32; 16] = floats_le(bytes);
        Mat4::from_cols_array(&floats)
    };

    // Column 0 sits on a wave node at phase 0; column 1 already moves forward.
    let first = vp * Mat4::from_translation(Vec3::new(-4.0, -4.0, 0.0));
    let second_column = vp * Mat4::from_translation(Vec3::new(-2.0, -4.0, 0.02));
    assert!(read(0).abs_diff_eq(first, 1e-5));
    assert!(read(25).abs_diff_eq(second_column, 1e-5));
}

fn floats_le(bytes: &[u8]) -> [f32; 16] {
    let mut floats = [0.0; 16];
    for (value, chunk) in floats.iter_mut().zip(bytes.chunks_exact(4)) {
        *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    floats
}
