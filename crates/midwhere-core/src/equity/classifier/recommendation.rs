use super::super::context::EquityContext;
use super::config::ClassifierConfig;
use super::EquityLevel;

pub(crate) fn recommend(
    level: EquityLevel,
    context: &EquityContext,
    config: &ClassifierConfig,
) -> String {
    let mean = context.mean_travel_time;
    let range = context.travel_time_range;

    match level {
        EquityLevel::Excellent => format!(
            "Excellent equity: travel times are closely balanced across {} participant(s) \
             (mean {mean:.0} min). This meeting point is a strong choice.",
            context.sample_size
        ),
        EquityLevel::Good => format!(
            "Good equity: travel burden is shared fairly evenly (mean {mean:.0} min, \
             spread {range:.0} min)."
        ),
        EquityLevel::Moderate => format!(
            "Moderate equity: some participants travel noticeably longer than others \
             (spread {range:.0} min). Consider nearby alternatives if anyone objects."
        ),
        EquityLevel::Poor | EquityLevel::VeryPoor => {
            let mut parts = vec![format!(
                "{} equity: travel burden is unevenly distributed (mean {mean:.0} min, \
                 spread {range:.0} min).",
                level.label()
            )];
            parts.extend(mitigations(context, config));
            parts.join(" ")
        }
    }
}

fn mitigations(context: &EquityContext, config: &ClassifierConfig) -> Vec<String> {
    let mut advice = Vec::new();

    if context.mode_diversity() >= config.mode_diversity_alert {
        advice.push(format!(
            "Mixed transport modes ({}) widen the gap; favour a venue near a transit hub that \
             walkers and cyclists can also reach.",
            context.modes_label()
        ));
    }

    if context.travel_time_range >= config.range_alert_minutes {
        advice.push(format!(
            "Travel times differ by {:.0} minutes; shift the meeting point toward the \
             participants with the longest journeys.",
            context.travel_time_range
        ));
    }

    if context.time_of_day.is_peak() {
        advice.push(format!(
            "{} peak traffic may amplify these differences; consider an off-peak time.",
            capitalize(context.time_of_day.label())
        ));
    }

    if advice.is_empty() {
        advice.push(
            "Consider re-weighting the meeting point toward participants with the longest \
             journeys."
                .to_string(),
        );
    }

    advice
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
