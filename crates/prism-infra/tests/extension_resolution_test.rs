//! Extension resolution scenarios over the headless probe.

use prism_core::renderer::extensions::ExtensionSet;
use prism_infra::headless::{well_known_extensions, HeadlessProbe};

#[test]
fn fully_advertised_driver_resolves_everything() {
    let probe = HeadlessProbe::advertising_well_known();
    let set = ExtensionSet::resolve(&probe, well_known_extensions());
    for descriptor in well_known_extensions() {
        assert!(set.is_advertised(descriptor.name), "{}", descriptor.name);
        assert!(set.is_available(descriptor.name), "{}", descriptor.name);
    }
    assert!(set
        .entry_point("GL_ARB_multitexture", "glActiveTextureARB")
        .is_some());
}

#[test]
fn one_missing_entry_point_disables_only_that_extension() {
    let probe = HeadlessProbe::advertising_well_known().without_entry_point("glMapBufferARB");
    let set = ExtensionSet::resolve(&probe, well_known_extensions());

    // The driver's claim stays visible, the derived feature flag does not.
    assert!(set.is_advertised("GL_ARB_vertex_buffer_object"));
    assert!(!set.is_available("GL_ARB_vertex_buffer_object"));
    // Entry points that did resolve are still withheld, all or nothing.
    assert!(set
        .entry_point("GL_ARB_vertex_buffer_object", "glGenBuffersARB")
        .is_none());

    // Unrelated extensions are untouched.
    assert!(set.is_available("GL_ARB_multitexture"));
    assert!(set.is_available("GL_ARB_occlusion_query"));
}

#[test]
fn query_only_extensions_need_no_entry_points() {
    // A probe that cannot resolve anything at all.
    let mut probe = HeadlessProbe::new(
        "GL_EXT_texture_filter_anisotropic GL_ARB_texture_non_power_of_two GL_ARB_multitexture",
    );
    for descriptor in well_known_extensions() {
        for &name in descriptor.entry_points {
            probe = probe.without_entry_point(name);
        }
    }
    let set = ExtensionSet::resolve(&probe, well_known_extensions());

    assert!(set.is_available("GL_EXT_texture_filter_anisotropic"));
    assert!(set.is_available("GL_ARB_texture_non_power_of_two"));
    // The advertised extension with entry points still fails as a whole.
    assert!(!set.is_available("GL_ARB_multitexture"));
}

#[test]
fn bare_driver_degrades_every_feature_without_failing() {
    let probe = HeadlessProbe::new("");
    let set = ExtensionSet::resolve(&probe, well_known_extensions());
    for descriptor in well_known_extensions() {
        assert!(!set.is_advertised(descriptor.name));
        assert!(!set.is_available(descriptor.name));
        for &name in descriptor.entry_points {
            assert!(set.entry_point(descriptor.name, name).is_none());
        }
    }
}
