//! End-to-end state cache scenarios against the headless driver.

use prism_core::math::{Mat4, Vec3};
use prism_core::renderer::caps::DeviceCapabilities;
use prism_core::renderer::common::VertexBufferId;
use prism_core::renderer::error::StateError;
use prism_core::renderer::state::{
    BackendKind, DeclarationSource, MaterialStateId, RenderStateId, StateCache,
    TexCoordGenMode, TexEnvMode, TextureStageStateId, TransformSlot, VertexAttribute,
    VertexBuffer, VertexElementType, VertexSemantic,
};
use prism_infra::headless::{DriverRecorder, HeadlessDriver};
use std::sync::Arc;

fn cache_with(caps: DeviceCapabilities, backend: BackendKind) -> (StateCache, DriverRecorder) {
    let _ = env_logger::builder().is_test(true).try_init();
    let driver = HeadlessDriver::new(caps);
    let recorder = driver.recorder();
    (StateCache::new(Box::new(driver), backend), recorder)
}

fn buffer(id: usize, backend: BackendKind, attributes: Vec<VertexAttribute>) -> Arc<VertexBuffer> {
    let stride = attributes.iter().map(|a| a.ty.byte_size()).sum();
    Arc::new(VertexBuffer::new(VertexBufferId(id), stride, attributes, backend).unwrap())
}

fn position_buffer(id: usize, backend: BackendKind) -> Arc<VertexBuffer> {
    buffer(
        id,
        backend,
        vec![VertexAttribute {
            semantic: VertexSemantic::Position,
            channel: 0,
            offset: 0,
            ty: VertexElementType::Float3,
        }],
    )
}

#[test]
fn out_of_range_stage_fails_then_double_set_costs_one_call() {
    let caps = DeviceCapabilities {
        max_texture_units: 4,
        ..Default::default()
    };
    let (mut cache, recorder) = cache_with(caps, BackendKind::OpenGl);
    let modulate = TexEnvMode::Modulate.to_word();

    // Stage 5 is beyond the 4 reported units: failure, zero driver calls.
    let err = cache
        .set_texture_stage_state(5, TextureStageStateId::ColorTexEnv, modulate)
        .unwrap_err();
    assert_eq!(err, StateError::StageOutOfRange { stage: 5, limit: 4 });
    assert_eq!(recorder.total_calls(), 0);

    // Setting the same value twice on a valid stage costs exactly one call.
    cache
        .set_texture_stage_state(2, TextureStageStateId::ColorTexEnv, modulate)
        .unwrap();
    cache
        .set_texture_stage_state(2, TextureStageStateId::ColorTexEnv, modulate)
        .unwrap();
    assert_eq!(recorder.texture_stage_state_calls(), 1);

    // The driver saw the translated OpenGL word, not the abstract value.
    assert_eq!(
        recorder.texture_stage_word(2, TextureStageStateId::ColorTexEnv),
        Some(0x2100) // GL_MODULATE
    );
}

#[test]
fn repeated_render_state_sets_reach_the_driver_once() {
    let (mut cache, recorder) = cache_with(DeviceCapabilities::default(), BackendKind::OpenGl);
    for _ in 0..5 {
        cache.set_render_state(RenderStateId::ZEnable, 1).unwrap();
    }
    assert_eq!(recorder.render_state_calls(), 1);

    cache.set_render_state(RenderStateId::ZEnable, 0).unwrap();
    assert_eq!(recorder.render_state_calls(), 2);
}

#[test]
fn single_stream_never_constructs_a_composite_declaration() {
    let (mut cache, recorder) = cache_with(DeviceCapabilities::default(), BackendKind::OpenGl);
    cache
        .set_vertex_buffer(Some(position_buffer(1, BackendKind::OpenGl)), 0, 0)
        .unwrap();
    assert_eq!(
        cache.apply_vertex_declaration().unwrap(),
        Some(DeclarationSource::PerBuffer)
    );
    assert!(!cache.has_composite_declaration());
    assert_eq!(recorder.declaration_installs(), 1);
    assert_eq!(recorder.installed_declaration_attributes(), Some(1));
}

#[test]
fn two_streams_rebuild_the_composite_exactly_once() {
    let (mut cache, recorder) = cache_with(DeviceCapabilities::default(), BackendKind::OpenGl);
    cache
        .set_vertex_buffer(Some(position_buffer(1, BackendKind::OpenGl)), 0, 0)
        .unwrap();
    cache
        .set_vertex_buffer(
            Some(buffer(
                2,
                BackendKind::OpenGl,
                vec![VertexAttribute {
                    semantic: VertexSemantic::TexCoord,
                    channel: 0,
                    offset: 0,
                    ty: VertexElementType::Float2,
                }],
            )),
            0,
            1,
        )
        .unwrap();

    assert_eq!(
        cache.apply_vertex_declaration().unwrap(),
        Some(DeclarationSource::Composite)
    );
    assert!(cache.has_composite_declaration());
    assert_eq!(recorder.installed_declaration_attributes(), Some(2));

    // Further pre-draw checks are free until a binding changes.
    for _ in 0..4 {
        cache.apply_vertex_declaration().unwrap();
    }
    assert_eq!(recorder.declaration_installs(), 1);

    cache
        .set_vertex_buffer(Some(position_buffer(3, BackendKind::OpenGl)), 0, 0)
        .unwrap();
    // Binding at stream 0 cleared stream 1; back to the per-buffer path.
    assert_eq!(
        cache.apply_vertex_declaration().unwrap(),
        Some(DeclarationSource::PerBuffer)
    );
    assert_eq!(recorder.declaration_installs(), 2);
}

#[test]
fn reflection_mapping_recomputes_the_texture_matrix_on_edges_only() {
    let (mut cache, recorder) = cache_with(DeviceCapabilities::default(), BackendKind::OpenGl);
    let reflection = TexCoordGenMode::ReflectionMap.to_word();

    cache
        .set_texture_stage_state(1, TextureStageStateId::TexGen, reflection)
        .unwrap();
    assert_eq!(recorder.texture_transform_calls(), 1);

    // Unrelated state changes on the same stage leave the matrix alone.
    cache
        .set_texture_stage_state(1, TextureStageStateId::ColorTexEnv, TexEnvMode::Add.to_word())
        .unwrap();
    cache
        .set_texture_stage_state(1, TextureStageStateId::AlphaTexEnv, TexEnvMode::Add.to_word())
        .unwrap();
    assert_eq!(recorder.texture_transform_calls(), 1);

    // A view change refreshes the reflecting stage.
    let view = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
    cache.set_transform(TransformSlot::View, &view).unwrap();
    assert_eq!(recorder.texture_transform_calls(), 2);

    // Leaving reflection mode is the other edge.
    cache
        .set_texture_stage_state(1, TextureStageStateId::TexGen, TexCoordGenMode::None.to_word())
        .unwrap();
    assert_eq!(recorder.texture_transform_calls(), 3);
}

#[test]
fn reset_applies_every_category_and_is_idempotent() {
    let caps = DeviceCapabilities {
        max_texture_units: 4,
        ..Default::default()
    };
    let (mut cache, recorder) = cache_with(caps, BackendKind::OpenGl);
    cache.reset().unwrap();

    assert_eq!(recorder.render_state_calls(), RenderStateId::COUNT);
    assert_eq!(recorder.color_calls(), 1);
    // Projection, view, world, plus one texture matrix per stage.
    assert_eq!(recorder.transform_calls(), 3 + 4);
    assert_eq!(
        recorder.texture_stage_state_calls(),
        4 * TextureStageStateId::COUNT
    );
    assert_eq!(recorder.material_state_calls(), MaterialStateId::COUNT);
    assert_eq!(recorder.light_calls() as u32, caps.max_active_lights);
    assert_eq!(recorder.clip_plane_calls() as u32, caps.max_clip_planes);

    // A second reset finds every value already cached at its default and
    // issues no driver traffic at all.
    let before = recorder.total_calls();
    cache.reset().unwrap();
    assert_eq!(recorder.total_calls(), before);
}
