//! Full depth-of-field pipeline runs against the headless backend.

use prism_core::renderer::caps::DeviceCapabilities;
use prism_core::renderer::common::{Extent2D, TextureFormat, TextureId, VertexBufferId};
use prism_core::renderer::pass::{
    DepthOfFieldEffect, DofOutcome, DofSettings, FrontBackTargets, FullscreenQuad,
    RenderTargetGuard,
};
use prism_core::renderer::state::{
    BackendKind, StateCache, VertexAttribute, VertexBuffer, VertexElementType, VertexSemantic,
};
use prism_core::renderer::traits::GraphicsDevice;
use prism_infra::headless::{DriverRecorder, HeadlessDevice, HeadlessDriver};
use std::sync::Arc;

const FRAME: Extent2D = Extent2D::new(256, 128);

struct Rig {
    device: HeadlessDevice,
    cache: StateCache,
    recorder: DriverRecorder,
    effect: DepthOfFieldEffect,
    targets: FrontBackTargets,
    normal_depth: TextureId,
    _gbuffer: RenderTargetGuard,
}

fn rig() -> Rig {
    let _ = env_logger::builder().is_test(true).try_init();
    let device = HeadlessDevice::new();
    let shared: Arc<dyn GraphicsDevice> = Arc::new(device.clone());

    let front =
        RenderTargetGuard::create(Arc::clone(&shared), FRAME, TextureFormat::Rgba8Unorm).unwrap();
    let back =
        RenderTargetGuard::create(Arc::clone(&shared), FRAME, TextureFormat::Rgba8Unorm).unwrap();
    let gbuffer =
        RenderTargetGuard::create(Arc::clone(&shared), FRAME, TextureFormat::Rgba16Float).unwrap();
    let normal_depth = gbuffer.color_texture();

    let quad = FullscreenQuad::new(Arc::new(
        VertexBuffer::new(
            VertexBufferId(1),
            8,
            vec![VertexAttribute {
                semantic: VertexSemantic::Position,
                channel: 0,
                offset: 0,
                ty: VertexElementType::Float2,
            }],
            BackendKind::Headless,
        )
        .unwrap(),
    ));

    let driver = HeadlessDriver::new(DeviceCapabilities::default());
    let recorder = driver.recorder();
    let cache = StateCache::new(Box::new(driver), BackendKind::Headless);

    Rig {
        effect: DepthOfFieldEffect::new(shared, quad),
        device,
        cache,
        recorder,
        targets: FrontBackTargets::new([front, back]),
        normal_depth,
        _gbuffer: gbuffer,
    }
}

fn render(rig: &mut Rig, settings: &DofSettings) -> DofOutcome {
    rig.effect
        .render(&mut rig.cache, &mut rig.targets, rig.normal_depth, settings)
        .unwrap()
}

#[test]
fn one_frame_runs_all_four_passes() {
    let mut rig = rig();
    let settings = DofSettings::default();
    assert_eq!(render(&mut rig, &settings), DofOutcome::Applied);

    let stats = rig.device.stats();
    // One shared vertex shader plus four fragment shaders, four programs.
    assert_eq!(stats.shaders_compiled, 5);
    assert_eq!(stats.programs_linked, 4);
    // Depth blur, downscale, two blur iterations, composite.
    assert_eq!(stats.draws, 5);
    assert_eq!(rig.recorder.declaration_installs(), 5);
    // Front/back, the G-buffer, and the two ping-pong targets.
    assert_eq!(stats.targets_created, 5);

    // The composited result ends up as the front image.
    assert_eq!(
        rig.device.bound_render_target(),
        Some(rig.targets.front().id())
    );

    // The blur pair is at the downscaled size.
    let pong = rig.effect.ping_pong_targets().unwrap();
    assert_eq!(pong.size(), Extent2D::new(64, 32));
    assert_eq!(pong.format(), TextureFormat::Rgba8Unorm);
}

#[test]
fn steady_state_frames_reuse_programs_targets_and_handles() {
    let mut rig = rig();
    let settings = DofSettings::default();
    assert_eq!(render(&mut rig, &settings), DofOutcome::Applied);
    let after_first = rig.device.stats();

    for _ in 0..3 {
        assert_eq!(render(&mut rig, &settings), DofOutcome::Applied);
    }
    let stats = rig.device.stats();
    assert_eq!(stats.shaders_compiled, after_first.shaders_compiled);
    assert_eq!(stats.programs_linked, after_first.programs_linked);
    assert_eq!(stats.targets_created, after_first.targets_created);
    // Uniform handles were resolved by name exactly once, on frame one.
    assert_eq!(stats.name_lookups, after_first.name_lookups);
    // But every frame re-uploaded its uniforms.
    assert_eq!(stats.uniform_uploads, after_first.uniform_uploads * 4);
}

#[test]
fn ping_pong_index_matches_blur_iteration_parity() {
    for passes in 0..5 {
        let mut rig = rig();
        let settings = DofSettings {
            blur_passes: passes,
            ..Default::default()
        };
        assert_eq!(render(&mut rig, &settings), DofOutcome::Applied);
        let pong = rig.effect.ping_pong_targets().unwrap();
        assert_eq!(
            pong.current_index() as u32,
            passes % 2,
            "after {passes} blur iterations"
        );
    }
}

#[test]
fn changing_the_downscale_recreates_both_blur_targets() {
    let mut rig = rig();
    let mut settings = DofSettings::default();
    assert_eq!(render(&mut rig, &settings), DofOutcome::Applied);
    assert_eq!(rig.device.stats().targets_destroyed, 0);

    settings.blur_downscale = 2.0;
    assert_eq!(render(&mut rig, &settings), DofOutcome::Applied);
    let stats = rig.device.stats();
    assert_eq!(stats.targets_destroyed, 2);
    assert_eq!(stats.targets_created, 7);
    assert_eq!(
        rig.effect.ping_pong_targets().unwrap().size(),
        Extent2D::new(128, 64)
    );
}

#[test]
fn downscale_below_one_never_upscales() {
    let mut rig = rig();
    let settings = DofSettings {
        blur_downscale: 0.25,
        ..Default::default()
    };
    assert_eq!(render(&mut rig, &settings), DofOutcome::Applied);
    assert_eq!(rig.effect.ping_pong_targets().unwrap().size(), FRAME);
}

#[test]
fn zero_weight_bypasses_the_frame_without_side_effects() {
    let mut rig = rig();
    let baseline = rig.device.stats();
    let settings = DofSettings {
        effect_weight: 0.0,
        ..Default::default()
    };
    assert_eq!(render(&mut rig, &settings), DofOutcome::Bypassed);
    assert_eq!(rig.device.stats(), baseline);
    assert_eq!(rig.recorder.total_calls(), 0);
    assert!(rig.effect.ping_pong_targets().is_none());
}

#[test]
fn disabled_flag_bypasses_even_with_full_weight() {
    let mut rig = rig();
    let settings = DofSettings {
        disabled: true,
        ..Default::default()
    };
    assert_eq!(render(&mut rig, &settings), DofOutcome::Bypassed);
    assert_eq!(rig.device.stats().shaders_compiled, 0);
}

#[test]
fn unknown_shading_language_bypasses_recoverably() {
    let mut rig = rig();
    rig.device.set_shading_language("HLSL");
    let settings = DofSettings::default();
    assert_eq!(render(&mut rig, &settings), DofOutcome::Bypassed);
    assert_eq!(rig.device.stats().shaders_compiled, 0);

    // Restoring a known language makes the next frame apply normally.
    rig.device.set_shading_language("GLSL");
    assert_eq!(render(&mut rig, &settings), DofOutcome::Applied);
}

#[test]
fn language_switch_rebuilds_programs_and_rereleases_shaders() {
    let mut rig = rig();
    let settings = DofSettings::default();
    assert_eq!(render(&mut rig, &settings), DofOutcome::Applied);
    let first = rig.device.stats();

    rig.device.set_shading_language("Cg");
    assert_eq!(render(&mut rig, &settings), DofOutcome::Applied);
    let stats = rig.device.stats();
    // The old programs and all five shaders were released, the shared
    // vertex shader exactly once, and the Cg table was compiled fresh.
    assert_eq!(stats.programs_destroyed, 4);
    assert_eq!(stats.shaders_destroyed, 5);
    assert_eq!(stats.shaders_compiled, first.shaders_compiled + 5);
    assert_eq!(stats.programs_linked, first.programs_linked + 4);
    // Handles were re-resolved once for the new programs.
    assert_eq!(stats.name_lookups, first.name_lookups * 2);
}

#[test]
fn missing_uniforms_skip_softly_without_failing_the_frame() {
    let mut rig = rig();
    rig.device.mark_uniform_missing("EffectWeight");
    let settings = DofSettings::default();
    assert_eq!(render(&mut rig, &settings), DofOutcome::Applied);

    // Every other binding still uploaded.
    let full = 4 + 2 + 2 * 3 + 4;
    assert_eq!(rig.device.stats().uniform_uploads, full - 1);
}
