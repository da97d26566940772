//! The immutable compiled-rule-set artifact (spec.md §4.3).

use warden_detect_types::{DetectError, GroupLimits, Profile, SghMpmContext, SnapshotId};

use crate::thread_keyword::ThreadKeywordRegistry;

/// The multi-pattern matcher variant selected for this snapshot.
///
/// Selection itself is owned by the (out-of-scope) pattern-matcher
/// factory; the snapshot only records and exposes it so SGH MPM
/// context resolution can consult it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MpmMatcher {
    Default,
    AcGfbs,
    AcBs,
    AcCuda,
    Other(String),
}

impl MpmMatcher {
    fn defaults_to_single_context(&self) -> bool {
        matches!(self, MpmMatcher::Default | MpmMatcher::AcGfbs | MpmMatcher::AcBs)
    }
}

/// Opaque id for a compiled signature. The signature compiler
/// (`LoadSignatures`/`BuildSignatureGroups`) is out of scope; the core
/// only stores whatever ids it hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompiledSignatureId(pub u32);

/// Placeholder for the out-of-scope reputation subsystem context.
#[derive(Debug, Clone, Default)]
pub struct ReputationContext;

/// Placeholder for the out-of-scope classification-file config.
#[derive(Debug, Clone, Default)]
pub struct ClassificationConfig;

/// Placeholder for the out-of-scope reference-file config.
#[derive(Debug, Clone, Default)]
pub struct ReferenceConfig;

/// An immutable, fully compiled rule set plus its config-derived knobs.
///
/// Per spec.md §3, after construction no field here ever mutates again;
/// the two things the original treats as mutable post-publication
/// (`ref_cnt`, the intrusive `next` link) are list membership and
/// `Arc` strong-count in this rewrite, both owned by
/// [`crate::MasterRegistry`] rather than by this type — see spec.md §9.
#[derive(Debug)]
pub struct EngineSnapshot {
    pub id: SnapshotId,
    pub config_prefix: Option<String>,
    pub init_failure_fatal: bool,
    pub inspection_recursion_limit: i32,
    pub mpm_matcher: MpmMatcher,
    pub group_limits: GroupLimits,
    pub profile: Profile,
    pub sgh_mpm_context: SghMpmContext,
    pub signatures: Vec<CompiledSignatureId>,
    pub reputation_context: Option<ReputationContext>,
    pub classification_config: Option<ClassificationConfig>,
    pub reference_config: Option<ReferenceConfig>,
    pub thread_keywords: ThreadKeywordRegistry,
    pub minimal: bool,
    /// Highest byte-extract local id any loaded signature uses. A
    /// worker's byte-extract scratch array is sized to this plus one,
    /// the way `DetectEngineThreadCtxInit` sizes `bj_values` off
    /// `de_ctx->byte_extract_max_local_id`.
    pub max_local_id: usize,
}

impl EngineSnapshot {
    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    /// Minimal build: just allocate and assign an id. Used by tests
    /// that need a snapshot to hang a `ThreadContext` off of without
    /// paying for rule compilation.
    pub fn init_minimal(id: SnapshotId) -> Self {
        EngineSnapshot {
            id,
            config_prefix: None,
            init_failure_fatal: true,
            inspection_recursion_limit: 3000,
            mpm_matcher: MpmMatcher::Default,
            group_limits: GroupLimits::MEDIUM,
            profile: Profile::Medium,
            sgh_mpm_context: SghMpmContext::Full,
            signatures: Vec::new(),
            reputation_context: None,
            classification_config: None,
            reference_config: None,
            thread_keywords: ThreadKeywordRegistry::new(),
            minimal: true,
            max_local_id: 0,
        }
    }

    /// Full build: resolves the profile, the inspection recursion
    /// limit, and the SGH MPM context mode from configuration. Rule
    /// compilation, reputation loading, and classification/reference
    /// loading are named external collaborators the caller is expected
    /// to have already run and fed in as `signatures` /
    /// `reputation_context` / ...; this builder's job is the knob
    /// resolution spec.md §4.3 actually specifies.
    pub fn init(
        id: SnapshotId,
        config: &dyn warden_detect_types::ConfigSource,
        config_prefix: Option<String>,
        matcher: MpmMatcher,
        unittest_run_mode: bool,
        signatures: Vec<CompiledSignatureId>,
        max_local_id: usize,
    ) -> Result<Self, DetectError> {
        let init_failure_fatal = config.get_bool("engine.init-failure-fatal").unwrap_or(true);
        let inspection_recursion_limit = resolve_recursion_limit(config);
        let (profile, group_limits) = resolve_profile(config);
        let sgh_mpm_context = resolve_sgh_mpm_context(config, &matcher, unittest_run_mode)?;

        Ok(EngineSnapshot {
            id,
            config_prefix,
            init_failure_fatal,
            inspection_recursion_limit,
            mpm_matcher: matcher,
            group_limits,
            profile,
            sgh_mpm_context,
            signatures,
            reputation_context: Some(ReputationContext),
            classification_config: Some(ClassificationConfig),
            reference_config: Some(ReferenceConfig),
            thread_keywords: ThreadKeywordRegistry::new(),
            minimal: false,
            max_local_id,
        })
    }
}

fn resolve_recursion_limit(config: &dyn warden_detect_types::ConfigSource) -> i32 {
    match config.get("detect-engine.inspection-recursion-limit") {
        None => 3000,
        // Mirrors `atoi()` in the original: any non-numeric value parses
        // as 0, which the next step turns into "unbounded".
        Some(raw) => match raw.parse::<i64>().unwrap_or(0) {
            0 => -1,
            n => n as i32,
        },
    }
}

fn resolve_profile(config: &dyn warden_detect_types::ConfigSource) -> (Profile, GroupLimits) {
    let profile = match config.get("detect-engine.profile") {
        None => Profile::Medium,
        Some("low") => Profile::Low,
        Some("medium") => Profile::Medium,
        Some("high") => Profile::High,
        Some("custom") => Profile::Custom,
        Some(other) => {
            tracing::warn!(value = other, "unknown detect-engine.profile, defaulting to medium");
            Profile::Medium
        }
    };

    if profile != Profile::Custom {
        return (profile, GroupLimits::for_profile(profile));
    }

    let field = |key: &str| -> u16 {
        let path = format!("detect-engine.custom-values.{key}-groups");
        match config.get(&path).and_then(|v| v.parse::<u16>().ok()) {
            Some(v) => v,
            None => {
                tracing::warn!(path, "missing or unparseable custom group limit, defaulting to medium value");
                field_default(key)
            }
        }
    };
    let limits = GroupLimits {
        toclient_src: field("toclient-src"),
        toclient_dst: field("toclient-dst"),
        toclient_sp: field("toclient-sp"),
        toclient_dp: field("toclient-dp"),
        toserver_src: field("toserver-src"),
        toserver_dst: field("toserver-dst"),
        toserver_sp: field("toserver-sp"),
        toserver_dp: field("toserver-dp"),
    };
    (Profile::Custom, limits)
}

fn field_default(key: &str) -> u16 {
    let m = GroupLimits::MEDIUM;
    match key {
        "toclient-src" => m.toclient_src,
        "toclient-dst" => m.toclient_dst,
        "toclient-sp" => m.toclient_sp,
        "toclient-dp" => m.toclient_dp,
        "toserver-src" => m.toserver_src,
        "toserver-dst" => m.toserver_dst,
        "toserver-sp" => m.toserver_sp,
        "toserver-dp" => m.toserver_dp,
        _ => unreachable!("field() is only called with the eight known keys"),
    }
}

fn resolve_sgh_mpm_context(
    config: &dyn warden_detect_types::ConfigSource,
    matcher: &MpmMatcher,
    unittest_run_mode: bool,
) -> Result<SghMpmContext, DetectError> {
    if unittest_run_mode {
        return Ok(SghMpmContext::Full);
    }
    let requested = config.get("detect-engine.sgh-mpm-context");
    let resolved = match requested {
        None | Some("auto") => {
            if matcher.defaults_to_single_context() {
                SghMpmContext::Single
            } else {
                SghMpmContext::Full
            }
        }
        Some("single") => SghMpmContext::Single,
        Some("full") => SghMpmContext::Full,
        Some(other) => {
            tracing::warn!(value = other, "unknown sgh-mpm-context, treating as auto");
            if matcher.defaults_to_single_context() {
                SghMpmContext::Single
            } else {
                SghMpmContext::Full
            }
        }
    };
    if resolved == SghMpmContext::Full && matches!(matcher, MpmMatcher::AcCuda) {
        return Err(DetectError::FullContextWithCuda);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use warden_detect_types::MapConfigSource;

    fn build(config: &MapConfigSource) -> EngineSnapshot {
        EngineSnapshot::init(SnapshotId(1), config, None, MpmMatcher::Default, false, Vec::new(), 0).unwrap()
    }

    #[rstest]
    #[case(None, 3000)]
    #[case(Some("0"), -1)]
    #[case(Some("10"), 10)]
    #[case(Some("BA"), -1)]
    fn s1_recursion_limit_parse(#[case] raw: Option<&str>, #[case] expect: i32) {
        let mut cfg = MapConfigSource::new();
        if let Some(raw) = raw {
            cfg.set("detect-engine.inspection-recursion-limit", raw);
        }
        assert_eq!(build(&cfg).inspection_recursion_limit, expect);
    }

    #[test]
    fn s2_custom_profile_values() {
        let cfg = MapConfigSource::new()
            .with("detect-engine.profile", "custom")
            .with("detect-engine.custom-values.toclient-src-groups", "20")
            .with("detect-engine.custom-values.toclient-dst-groups", "21")
            .with("detect-engine.custom-values.toclient-sp-groups", "22")
            .with("detect-engine.custom-values.toclient-dp-groups", "23")
            .with("detect-engine.custom-values.toserver-src-groups", "24")
            .with("detect-engine.custom-values.toserver-dst-groups", "25")
            .with("detect-engine.custom-values.toserver-sp-groups", "26")
            .with("detect-engine.custom-values.toserver-dp-groups", "27");
        let snap = build(&cfg);
        assert_eq!(
            snap.group_limits,
            GroupLimits {
                toclient_src: 20,
                toclient_dst: 21,
                toclient_sp: 22,
                toclient_dp: 23,
                toserver_src: 24,
                toserver_dst: 25,
                toserver_sp: 26,
                toserver_dp: 27,
            }
        );
    }

    #[test]
    fn s3_bad_custom_values_fall_back_to_medium() {
        let _ = tracing_subscriber::fmt::try_init();
        let mut cfg = MapConfigSource::new().with("detect-engine.profile", "custom");
        for key in [
            "toclient-src", "toclient-dst", "toclient-sp", "toclient-dp", "toserver-src", "toserver-dst",
            "toserver-sp", "toserver-dp",
        ] {
            cfg.set(format!("detect-engine.custom-values.{key}-groups"), "BA");
        }
        assert_eq!(build(&cfg).group_limits, GroupLimits::MEDIUM);
    }

    #[test]
    fn sgh_context_single_for_default_matcher() {
        let cfg = MapConfigSource::new();
        assert_eq!(build(&cfg).sgh_mpm_context, SghMpmContext::Single);
    }

    #[test]
    fn sgh_context_full_override() {
        let cfg = MapConfigSource::new().with("detect-engine.sgh-mpm-context", "full");
        assert_eq!(build(&cfg).sgh_mpm_context, SghMpmContext::Full);
    }

    #[test]
    fn sgh_context_always_full_in_unittest_run_mode() {
        let cfg = MapConfigSource::new().with("detect-engine.sgh-mpm-context", "single");
        let snap = EngineSnapshot::init(SnapshotId(1), &cfg, None, MpmMatcher::Default, true, Vec::new(), 0).unwrap();
        assert_eq!(snap.sgh_mpm_context, SghMpmContext::Full);
    }

    #[test]
    fn full_with_cuda_matcher_is_a_fatal_config_error() {
        let cfg = MapConfigSource::new().with("detect-engine.sgh-mpm-context", "full");
        let err =
            EngineSnapshot::init(SnapshotId(1), &cfg, None, MpmMatcher::AcCuda, false, Vec::new(), 0).unwrap_err();
        assert!(matches!(err, DetectError::FullContextWithCuda));
    }

    #[test]
    fn init_minimal_skips_resolution() {
        let snap = EngineSnapshot::init_minimal(SnapshotId(7));
        assert!(snap.minimal);
        assert_eq!(snap.id, SnapshotId(7));
        assert_eq!(snap.signature_count(), 0);
    }
}
