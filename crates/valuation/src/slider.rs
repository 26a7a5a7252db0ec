//! Interactive green/development slider.
//!
//! [`reoptimize`] is the whole hot path: one hybrid composition over the
//! memoized per-site baselines. No engines, no I/O. The ECS side feeds it from
//! [`GreenFractionChanged`] events and publishes the result in [`LiveHybrid`].

use bevy::prelude::*;

use crate::intent::UserIntent;
use crate::scenario::{composer, Scenario, ScenarioBaselines};

/// Clamps `green` to the interactive range carried by the baselines.
pub fn clamp_to_interactive(baselines: &ScenarioBaselines, green: f64) -> f64 {
    let min = baselines.policy.green_fraction_min;
    let max = baselines.policy.green_fraction_max;
    if green.is_nan() {
        return min;
    }
    green.clamp(min, max)
}

/// Hybrid scenario at slider position `green`. Idempotent and side-effect free.
pub fn reoptimize(baselines: &ScenarioBaselines, intent: UserIntent, green: f64) -> Scenario {
    composer::hybrid(baselines, intent, clamp_to_interactive(baselines, green))
}

// =============================================================================
// ECS
// =============================================================================

/// Slider moved to `value`.
#[derive(Event, Debug, Clone, Copy)]
pub struct GreenFractionChanged {
    pub value: f64,
}

/// Baselines of the site currently on screen.
#[derive(Resource, Debug, Default)]
pub struct SliderBaselines {
    pub baselines: Option<ScenarioBaselines>,
    pub intent: UserIntent,
}

/// Latest hybrid produced by the slider.
#[derive(Resource, Debug, Default)]
pub struct LiveHybrid {
    pub scenario: Option<Scenario>,
    /// Incremented on every recompute.
    pub revision: u64,
}

/// Applies the most recent slider position of this frame. Earlier positions
/// in the same frame are superseded, not replayed.
pub fn apply_green_fraction(
    mut events: EventReader<GreenFractionChanged>,
    slider: Res<SliderBaselines>,
    mut live: ResMut<LiveHybrid>,
) {
    let Some(latest) = events.read().last().copied() else {
        return;
    };
    let Some(baselines) = slider.baselines.as_ref() else {
        warn!(
            "Slider moved to {:.2} before any analysis completed; ignoring",
            latest.value
        );
        return;
    };
    live.scenario = Some(reoptimize(baselines, slider.intent, latest.value));
    live.revision += 1;
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::cash_flow::CashFlowCategory;
    use crate::scenario::composer::tests::synthetic_baselines;

    #[test]
    fn test_reoptimize_clamps_to_interactive_range() {
        let b = synthetic_baselines(0.4);
        assert_eq!(reoptimize(&b, UserIntent::Mixed, 0.0).green_fraction, 0.10);
        assert_eq!(reoptimize(&b, UserIntent::Mixed, 1.0).green_fraction, 0.90);
        assert_eq!(reoptimize(&b, UserIntent::Mixed, f64::NAN).green_fraction, 0.10);
        assert_eq!(reoptimize(&b, UserIntent::Mixed, 0.42).green_fraction, 0.42);
    }

    #[test]
    fn test_reoptimize_is_idempotent() {
        let b = synthetic_baselines(0.4);
        let first = reoptimize(&b, UserIntent::Solar, 0.37);
        let second = reoptimize(&b, UserIntent::Solar, 0.37);
        assert_eq!(first, second);
    }

    #[test]
    fn test_min_slider_dev_term_below_develop() {
        let b = synthetic_baselines(0.4);
        let h = reoptimize(&b, UserIntent::Mixed, 0.0);
        let d = composer::develop(&b, UserIntent::Mixed);
        let dev_h = h.term_at(10, CashFlowCategory::DevProfit);
        let dev_d = d.term_at(10, CashFlowCategory::DevProfit);
        assert!(dev_h < dev_d, "slider min must stay short of full development");
        assert!((dev_h - 0.9 * dev_d).abs() < 1e-6);
    }

    #[test]
    fn test_reoptimize_is_fast() {
        let b = synthetic_baselines(0.4);
        let start = Instant::now();
        for step in 0..1_000 {
            let g = step as f64 / 1_000.0;
            std::hint::black_box(reoptimize(&b, UserIntent::Mixed, g));
        }
        let per_call = start.elapsed() / 1_000;
        assert!(
            per_call.as_millis() < 50,
            "slider recompute took {per_call:?} per call"
        );
    }

    #[test]
    fn test_system_uses_latest_event() {
        let mut app = App::new();
        app.add_event::<GreenFractionChanged>()
            .insert_resource(SliderBaselines {
                baselines: Some(synthetic_baselines(0.4)),
                intent: UserIntent::Mixed,
            })
            .init_resource::<LiveHybrid>()
            .add_systems(Update, apply_green_fraction);

        app.world_mut().send_event(GreenFractionChanged { value: 0.2 });
        app.world_mut().send_event(GreenFractionChanged { value: 0.7 });
        app.update();

        let live = app.world().resource::<LiveHybrid>();
        assert_eq!(live.revision, 1);
        let scenario = live.scenario.as_ref().expect("hybrid published");
        assert_eq!(scenario.green_fraction, 0.7);
    }

    #[test]
    fn test_system_without_baselines_is_noop() {
        let mut app = App::new();
        app.add_event::<GreenFractionChanged>()
            .init_resource::<SliderBaselines>()
            .init_resource::<LiveHybrid>()
            .add_systems(Update, apply_green_fraction);
        app.world_mut().send_event(GreenFractionChanged { value: 0.5 });
        app.update();
        let live = app.world().resource::<LiveHybrid>();
        assert!(live.scenario.is_none());
        assert_eq!(live.revision, 0);
    }
}
