//! HTML page for a report

use maud::{html, Markup, PreEscaped, DOCTYPE};

use super::Report;
use crate::analysis::counter::{Direction, OrderedCounter};

const SIZE_UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

/// Human readable SI size: `512 B`, `1.5 kB`, `23 MB`
pub fn filesize(bytes: u64) -> String {
    if bytes < 10 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    let rounded = (value * 10.0 + 0.5).floor() / 10.0;
    if rounded < 10.0 {
        format!("{:.1} {}", rounded, SIZE_UNITS[unit])
    } else {
        format!("{:.0} {}", rounded, SIZE_UNITS[unit])
    }
}

/// JSON safe to inline inside a `<script>` element
fn inline_json(report: &Report) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(report)?.replace('<', "\\u003c"))
}

fn leaderboard(counts: &std::collections::BTreeMap<String, u64>) -> OrderedCounter {
    let mut counter = OrderedCounter::new();
    for (key, value) in counts {
        counter.set(key, *value);
    }
    counter.sort_by(Direction::Descending);
    counter
}

pub fn page(report: &Report) -> Result<String, serde_json::Error> {
    let data = inline_json(report)?;
    let regions = leaderboard(&report.region_total);
    let statuses = leaderboard(&report.status_total);
    let period = match (report.days.first(), report.days.last()) {
        (Some(first), Some(last)) if first != last => format!("{} – {}", first, last),
        (Some(first), _) => first.clone(),
        _ => "no data".to_string(),
    };

    let markup: Markup = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Access log report" }
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                link rel="stylesheet" href="static/report.css";
            }
            body {
                h1 { "Access log report" }
                p.period { (period) }

                section.summary {
                    div.card { span.label { "Hits" } span.value { (report.hit_total) } }
                    div.card { span.label { "Traffic" } span.value { (filesize(report.bytes_total)) } }
                    div.card { span.label { "Visitors" } span.value { (report.visitors.len()) } }
                    div.card { span.label { "Days" } span.value { (report.days.len()) } }
                }

                section {
                    h2 { "Daily traffic" }
                    table {
                        thead { tr { th { "Day" } th { "Hits" } th { "Traffic" } th { "Visitors" } } }
                        tbody {
                            @for day in &report.days {
                                tr {
                                    td { (day) }
                                    td { (report.hit_days.get(day).copied().unwrap_or(0)) }
                                    td { (filesize(report.bytes_days.get(day).copied().unwrap_or(0))) }
                                    td { (report.visitors_days.get(day).map(|v| v.len()).unwrap_or(0)) }
                                }
                            }
                        }
                    }
                }

                section {
                    h2 { "Status codes" }
                    table {
                        thead { tr { th { "Status" } th { "Count" } } }
                        tbody {
                            @for (status, count) in statuses.iter() {
                                tr { td { (status) } td { (count) } }
                            }
                        }
                    }
                }

                section {
                    h2 { "Top visitors" }
                    table {
                        thead { tr { th { "Address" } th { "Hits" } } }
                        tbody {
                            @for (address, count) in report.visitors.iter() {
                                tr { td { (address) } td { (count) } }
                            }
                        }
                    }
                }

                section {
                    h2 { "Regions" }
                    @if regions.is_empty() {
                        p { "No visitor could be located." }
                    } @else {
                        table {
                            thead { tr { th { "Region" } th { "Hits" } th { "Location" } } }
                            tbody {
                                @for (name, count) in regions.iter() {
                                    tr {
                                        td { (name) }
                                        td { (count) }
                                        td {
                                            @if let Some([lon, lat]) = report.region_location.get(name) {
                                                (format!("{:.2}, {:.2}", lat, lon))
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                script type="application/json" id="report-data" { (PreEscaped(data)) }
            }
        }
    };
    Ok(markup.into_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_filesize() {
        assert_eq!(filesize(0), "0 B");
        assert_eq!(filesize(9), "9 B");
        assert_eq!(filesize(512), "512 B");
        assert_eq!(filesize(1500), "1.5 kB");
        assert_eq!(filesize(15_000), "15 kB");
        assert_eq!(filesize(3_200_000), "3.2 MB");
        assert_eq!(filesize(2_000_000_000), "2.0 GB");
    }

    #[test]
    fn test_page_escapes_and_embeds_data() {
        let mut report = Report::default();
        report.days = vec!["2024-01-01".to_string()];
        report.hit_total = 1;
        report.bytes_total = 512;
        report.visitors.set("<script>", 1);
        report.hit_days = BTreeMap::from([("2024-01-01".to_string(), 1)]);

        let html = page(&report).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("512 B"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(r#"id="report-data""#));
        assert!(html.contains(r"\u003cscript>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("No visitor could be located."));
    }

    #[test]
    fn test_regions_listed_busiest_first() {
        let mut report = Report::default();
        report.region_total = BTreeMap::from([
            ("Alpha".to_string(), 1),
            ("Beta".to_string(), 5),
        ]);
        report.region_location = BTreeMap::from([("Beta".to_string(), [2.35, 48.85])]);

        let html = page(&report).unwrap();
        let beta = html.find("Beta").unwrap();
        let alpha = html.find("Alpha").unwrap();
        assert!(beta < alpha);
        assert!(html.contains("48.85, 2.35"));
    }
}
