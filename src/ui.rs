use crate::controller::SelectionSnapshot;
use crate::dashboard::SectionState;
use crate::models::SelectOption;
use crate::range::format_date;
use serde_json::Value;

pub fn render_index(snapshot: &SelectionSnapshot) -> String {
    let selection = &snapshot.selection;
    INDEX_HTML
        .replace("{{PHASE}}", &escape(&format!("{:?}", snapshot.phase)))
        .replace("{{DATE_START}}", &format_date(selection.date_range.start))
        .replace("{{DATE_END}}", &format_date(selection.date_range.end))
        .replace("{{REF_DATE_START}}", &format_date(selection.comparison_window.start))
        .replace("{{REF_DATE_END}}", &format_date(selection.comparison_window.end))
        .replace(
            "{{START_OPTIONS}}",
            &render_options(&snapshot.selectors.start_options, &selection.selected_start_time),
        )
        .replace(
            "{{END_OPTIONS}}",
            &render_options(&snapshot.selectors.end_options, &selection.selected_end_time),
        )
        .replace("{{SECTIONS}}", &render_sections(snapshot))
}

fn render_options(options: &[SelectOption], selected: &str) -> String {
    options
        .iter()
        .map(|option| {
            let mut attrs = String::new();
            if option.disabled {
                attrs.push_str(" disabled");
            }
            if !option.disabled && option.value == selected {
                attrs.push_str(" selected");
            }
            format!(
                r#"<option value="{}"{attrs}>{}</option>"#,
                escape(&option.value),
                escape(&option.label)
            )
        })
        .collect()
}

fn render_sections(snapshot: &SelectionSnapshot) -> String {
    snapshot
        .dashboard
        .sections()
        .map(|(key, state)| {
            let body = match state {
                SectionState::Ready(Value::Object(fields)) => fields
                    .keys()
                    .map(|field| {
                        format!(
                            "<dt>{}</dt><dd>{}</dd>",
                            escape(field),
                            escape(&snapshot.dashboard.text(&key, field))
                        )
                    })
                    .collect::<String>(),
                _ => format!("<dd>{}</dd>", escape(&snapshot.dashboard.text(&key, "total"))),
            };
            format!(r#"<section id="{key}"><h2>{key}</h2><dl>{body}</dl></section>"#)
        })
        .collect()
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Footfall Dashboard</title>
</head>
<body>
  <main>
    <p id="phase">{{PHASE}}</p>

    <form method="post" action="/selection/dates">
      <label>Start date <input type="date" name="date_start" value="{{DATE_START}}" /></label>
      <label>End date <input type="date" name="date_end" value="{{DATE_END}}" /></label>
      <label>Compare start <input type="date" name="ref_date_start" value="{{REF_DATE_START}}" /></label>
      <label>Compare end <input type="date" name="ref_date_end" value="{{REF_DATE_END}}" /></label>
      <button type="submit">Apply dates</button>
    </form>

    <form method="post" action="/selection/start-time">
      <label>Start time <select name="value">{{START_OPTIONS}}</select></label>
      <button type="submit">Set start</button>
    </form>

    <form method="post" action="/selection/end-time">
      <label>End time <select name="value">{{END_OPTIONS}}</select></label>
      <button type="submit">Set end</button>
    </form>

    {{SECTIONS}}
  </main>
</body>
</html>
"#;
