//! Server-side HTML for the quote form.
//!
//! Every value written into the page is either a constant, a number or a
//! label taken from the encoding schema, so nothing user-supplied reaches
//! the markup.

use pawtection_model::{CategoryMap, EncodingSchema, Quote, Selection, PLACEHOLDER};
use std::fmt::Write;

/// Static page layout and styling
#[derive(Debug, Clone, Copy)]
pub struct FormLayout {
    pub page_title: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub form_heading: &'static str,
    pub summary_heading: &'static str,
    pub submit_label: &'static str,
    pub hint: &'static str,
    pub title_colour: &'static str,
    pub subtitle_colour: &'static str,
    pub panel_background: &'static str,
    pub warning_background: &'static str,
}

pub const FORM_LAYOUT: FormLayout = FormLayout {
    page_title: "Pawtection - Pet Insurance",
    title: "🐶 Pawtection",
    subtitle: "Your trusted third-party dog insurance, built to protect your furry friend 🐾",
    form_heading: "🐾 Pet Details",
    summary_heading: "📋 Insurance Summary",
    submit_label: "🔍 Estimate My Premium",
    hint: "To estimate your insurance premium, we'll need your dog's breed, age, gender, \
           spay/neuter status, bite history, and your current borough of residence.",
    title_colour: "#2c3e50",
    subtitle_colour: "#7f8c8d",
    panel_background: "#fff2cc",
    warning_background: "#fdecea",
};

/// What the right-hand summary panel shows
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Fresh form: show the hint
    Hint,
    /// Submission rejected; show the warning, no prediction
    Warning(String),
    Quoted(Quote),
}

/// Render the complete page. `selection` pre-selects the submitted values.
pub fn render_page(
    layout: &FormLayout,
    schema: &EncodingSchema,
    selection: Option<&Selection>,
    outcome: &Outcome,
) -> String {
    let mut html = String::with_capacity(8 * 1024);

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{page_title}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 960px; margin: 0 auto; padding: 2rem; }}
        .big-title {{ text-align: center; font-size: 2.5rem; color: {title_colour}; margin-bottom: 0.2em; }}
        .subtitle {{ text-align: center; font-size: 1.2rem; color: {subtitle_colour}; margin-bottom: 2rem; }}
        .columns {{ display: flex; gap: 2rem; }}
        .columns > div {{ flex: 1; }}
        .fields {{ display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }}
        label {{ display: block; font-weight: 600; margin-bottom: 0.3rem; }}
        select {{ width: 100%; padding: 0.4rem; }}
        button {{ margin-top: 1.5rem; padding: 0.6rem 1.2rem; cursor: pointer; }}
        .panel {{ background: {panel_background}; padding: 1rem; border-radius: 8px; margin-top: 1rem; color: black; }}
        .warning {{ background: {warning_background}; padding: 1rem; border-radius: 8px; margin-top: 1rem; color: black; }}
    </style>
</head>
<body>
    <div class="big-title">{title}</div>
    <div class="subtitle">{subtitle}</div>
    <div class="columns">
        <div>
            <h3>{form_heading}</h3>
            <form method="post" action="/quote">
                <div class="fields">
"#,
        page_title = layout.page_title,
        title_colour = layout.title_colour,
        subtitle_colour = layout.subtitle_colour,
        panel_background = layout.panel_background,
        warning_background = layout.warning_background,
        title = layout.title,
        subtitle = layout.subtitle,
        form_heading = layout.form_heading,
    );

    let current = |field: Option<&str>| field.unwrap_or(PLACEHOLDER).to_string();
    let is_bite = current(selection.map(|s| s.is_bite.as_str()));
    let breed = current(selection.map(|s| s.breed.as_str()));
    let gender = current(selection.map(|s| s.gender.as_str()));
    let spay_neuter = current(selection.map(|s| s.spay_neuter.as_str()));
    let borough = current(selection.map(|s| s.borough.as_str()));

    category_select(&mut html, "is_bite", "🩸 Bite Before", &schema.bite_history, &is_bite);
    category_select(&mut html, "gender", "⚧️ Gender", &schema.gender, &gender);
    category_select(&mut html, "breed", "🐕 Breed", &schema.breed, &breed);
    category_select(&mut html, "spay_neuter", "✂️ Spay/Neuter", &schema.spay_neuter, &spay_neuter);
    age_select(&mut html, schema, selection.map(|s| s.age));
    category_select(&mut html, "borough", "📍 Borough", &schema.borough, &borough);

    let _ = write!(
        html,
        r#"                </div>
                <button type="submit">{submit_label}</button>
            </form>
        </div>
        <div>
            <h3>{summary_heading}</h3>
"#,
        submit_label = layout.submit_label,
        summary_heading = layout.summary_heading,
    );

    match outcome {
        Outcome::Hint => {
            let _ = writeln!(html, r#"            <div class="panel"><p>{}</p></div>"#, layout.hint);
        }
        Outcome::Warning(message) => {
            let _ = writeln!(html, r#"            <div class="panel"><p>{}</p></div>"#, layout.hint);
            let _ = writeln!(html, r#"            <div class="warning"><p>🚫 {}</p></div>"#, message);
        }
        Outcome::Quoted(quote) => summary_panel(&mut html, schema, quote),
    }

    html.push_str(
        r#"        </div>
    </div>
</body>
</html>
"#,
    );

    html
}

fn category_select(html: &mut String, name: &str, label: &str, map: &CategoryMap, current: &str) {
    let _ = writeln!(
        html,
        r#"                    <div><label for="{name}">{label}</label><select id="{name}" name="{name}">"#
    );
    let options = std::iter::once(PLACEHOLDER).chain(map.labels());
    for option in options {
        let marker = if option == current { " selected" } else { "" };
        let _ = writeln!(html, r#"                        <option value="{option}"{marker}>{option}</option>"#);
    }
    html.push_str("                    </select></div>\n");
}

fn age_select(html: &mut String, schema: &EncodingSchema, current: Option<u8>) {
    html.push_str(
        r#"                    <div><label for="age">🎀 Age</label><select id="age" name="age">"#,
    );
    html.push('\n');
    let current = current.unwrap_or(schema.min_age);
    for age in schema.ages() {
        let marker = if age == current { " selected" } else { "" };
        let _ = writeln!(html, r#"                        <option value="{age}"{marker}>{age} years</option>"#);
    }
    html.push_str("                    </select></div>\n");
}

fn summary_panel(html: &mut String, schema: &EncodingSchema, quote: &Quote) {
    let record = &quote.record;
    let label = |map: &CategoryMap, code: f64| map.label_for(code as i64).unwrap_or("Unknown").to_string();

    let breed = label(&schema.breed, record.breed);
    let gender = label(&schema.gender, record.gender).to_lowercase();
    let borough = label(&schema.borough, record.borough);
    let spay = label(&schema.spay_neuter, record.spay_neuter);
    let bite = label(&schema.bite_history, record.is_bite);

    let _ = write!(
        html,
        r#"            <div class="panel">
                <p>Your dog is a <strong>{age}-year-old {gender}</strong> <strong>{breed}</strong> living in <strong>{borough}</strong> borough.</p>
                <p>Spayed/Neutered: <strong>{spay}</strong></p>
                <p>Bite before: <strong>{bite}</strong></p>
                <p>⚠️ <strong>Estimated Biting Risk:</strong> <span style="font-weight:bold; color:{colour}; font-size:1.2rem;">{score} / 100</span></p>
                <p>💰 <strong>Estimated Monthly Premium:</strong> <span style="font-weight:bold; font-size:1.2rem;">${premium}</span></p>
            </div>
"#,
        age = record.age,
        colour = quote.band.colour(),
        score = quote.display_score,
        premium = quote.premium,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawtection_model::{
        Node, Pipeline, PipelineMetadata, Predictor, QuoteConfig, RandomForest, Record, RiskBand,
        StandardScaler, Tree, FEATURE_COUNT,
    };

    fn schema() -> &'static EncodingSchema {
        EncodingSchema::builtin()
    }

    #[test]
    fn fresh_form_shows_placeholders_and_hint() {
        let html = render_page(&FORM_LAYOUT, schema(), None, &Outcome::Hint);

        assert!(html.contains("<title>Pawtection - Pet Insurance</title>"));
        assert!(html.contains(FORM_LAYOUT.hint));
        assert_eq!(
            html.matches(r#"<option value="Please Select.." selected>"#).count(),
            5
        );
        assert!(html.contains(r#"<option value="1" selected>1 years</option>"#));
        assert!(html.contains(r#"<option value="19">19 years</option>"#));
        assert!(!html.contains("Estimated Biting Risk"));
    }

    #[test]
    fn warning_keeps_hint_and_skips_summary() {
        let html = render_page(
            &FORM_LAYOUT,
            schema(),
            None,
            &Outcome::Warning("Please make sure all dropdown fields are selected before estimating the premium.".into()),
        );
        assert!(html.contains("🚫 Please make sure all dropdown fields are selected"));
        assert!(!html.contains("Estimated Monthly Premium"));
    }

    #[test]
    fn quote_summary_uses_schema_labels() {
        let selection = Selection {
            is_bite: "Yes".into(),
            breed: "Pit Bull".into(),
            age: 3,
            gender: "Male".into(),
            spay_neuter: "No".into(),
            borough: "Staten Island".into(),
        };
        let quote = Quote {
            record: Record::new(2, 3, 1, 0, 5, 1),
            raw_score: 82.4,
            score: 82.4,
            display_score: 82,
            band: RiskBand::High,
            premium: 84,
        };

        let html = render_page(&FORM_LAYOUT, schema(), Some(&selection), &Outcome::Quoted(quote));

        assert!(html.contains("<strong>3-year-old male</strong> <strong>Pit Bull</strong>"));
        assert!(html.contains("<strong>Staten Island</strong> borough"));
        assert!(html.contains("color:#e74c3c; font-size:1.2rem;\">82 / 100"));
        assert!(html.contains("$84"));
        assert!(html.contains(r#"<option value="Pit Bull" selected>"#));
        assert!(html.contains(r#"<option value="3" selected>3 years</option>"#));
        assert!(!html.contains(FORM_LAYOUT.hint));
    }

    fn quote_for(raw: f64) -> Quote {
        let pipeline = Pipeline::new(
            StandardScaler::identity(1),
            RandomForest::new(vec![Tree::new(vec![Node::leaf(0, raw)])], FEATURE_COUNT),
            PipelineMetadata {
                n_trees: 1,
                seed: 42,
                n_samples: 1,
                trained_at: 0,
            },
        );
        Predictor::new(pipeline, QuoteConfig::default()).quote_record(Record::new(2, 3, 1, 0, 5, 1))
    }

    #[test]
    fn colour_matches_displayed_score() {
        let cases = [
            (70.4, "color:#f39c12; font-size:1.2rem;\">70 / 100"),
            (30.4, "color:#27ae60; font-size:1.2rem;\">30 / 100"),
            (30.6, "color:#f39c12; font-size:1.2rem;\">31 / 100"),
        ];

        for (raw, expected) in cases {
            let html = render_page(&FORM_LAYOUT, schema(), None, &Outcome::Quoted(quote_for(raw)));
            assert!(html.contains(expected), "raw {raw} should render {expected}");
        }
    }
}
