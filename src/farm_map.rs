//! Leaflet markup for the farm location map. The coordinate table is fixed
//! reference data; farms in the report that have no entry here are skipped.

use crate::report::ProductionReport;

const FARM_LOCATIONS: [(&str, f64, f64); 5] = [
    ("A", 37.5665, 126.9780),
    ("B", 35.1796, 129.0756),
    ("C", 35.1595, 126.8526),
    ("D", 36.3504, 127.3845),
    ("E", 37.4563, 126.7052),
];

const MAP_CENTER: (f64, f64) = (36.5, 127.5);
const MAP_ZOOM: u8 = 7;

pub fn lookup(farm: &str) -> Option<(f64, f64)> {
    FARM_LOCATIONS
        .iter()
        .find(|(name, _, _)| *name == farm)
        .map(|(_, lat, lng)| (*lat, *lng))
}

// The farm name lands inside a single-quoted JS string whose content is
// rendered as popup HTML, so both layers need escaping.
fn escape_popup(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("\\'"),
            '\\' => escaped.push_str("\\\\"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Self-contained map snippet: a container div plus the Leaflet assets and one
/// circle marker per known farm, popup showing the exact row count.
pub fn render(report: &ProductionReport) -> String {
    let mut markers = String::new();
    for stat in &report.farm_stats {
        let Some((lat, lng)) = lookup(&stat.farm) else {
            continue;
        };
        markers.push_str(&format!(
            "  L.circleMarker([{lat}, {lng}], {{radius: 15, color: '#3182f6', fillColor: '#3182f6', fillOpacity: 0.7}})\n    .bindPopup('<b>Farm {farm}</b><br>{count} birds').addTo(map);\n",
            farm = escape_popup(&stat.farm),
            count = stat.count,
        ));
    }

    format!(
        "<link rel=\"stylesheet\" href=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.css\"/>\n\
         <script src=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.js\"></script>\n\
         <div id=\"farm-map\" style=\"height: 420px;\"></div>\n\
         <script>\n\
         \x20 var map = L.map('farm-map').setView([{lat}, {lng}], {zoom});\n\
         \x20 L.tileLayer('https://{{s}}.basemaps.cartocdn.com/light_all/{{z}}/{{x}}/{{y}}{{r}}.png', {{maxZoom: 19}}).addTo(map);\n\
         {markers}\
         </script>\n",
        lat = MAP_CENTER.0,
        lng = MAP_CENTER.1,
        zoom = MAP_ZOOM,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductionRow;

    fn report_for_farms(farms: &[&str]) -> ProductionReport {
        let rows: Vec<ProductionRow> = farms
            .iter()
            .enumerate()
            .map(|(i, farm)| ProductionRow {
                chick_no: i as i64 + 1,
                breeds: "ross".to_string(),
                gender: "F".to_string(),
                farm: farm.to_string(),
                raw_weight: Some(1000.0),
                prod_date: None,
            })
            .collect();
        ProductionReport::from_rows(&rows)
    }

    #[test]
    fn known_farms_get_markers_with_counts() {
        let report = report_for_farms(&["A", "A", "B"]);
        let html = render(&report);

        assert!(html.contains("Farm A</b><br>2 birds"));
        assert!(html.contains("Farm B</b><br>1 birds"));
        assert_eq!(html.matches("circleMarker").count(), 2);
    }

    #[test]
    fn unknown_farm_is_skipped_silently() {
        let report = report_for_farms(&["Z"]);
        let html = render(&report);

        assert_eq!(html.matches("circleMarker").count(), 0);
        assert!(html.contains("farm-map"));
    }

    #[test]
    fn lookup_misses_return_none() {
        assert_eq!(lookup("C"), Some((35.1595, 126.8526)));
        assert_eq!(lookup("unknown"), None);
    }

    #[test]
    fn popup_text_cannot_break_out_of_the_markup() {
        assert_eq!(
            escape_popup("A'</script>"),
            "A\\'&lt;/script&gt;"
        );
        assert_eq!(escape_popup("B\\"), "B\\\\");
        assert_eq!(escape_popup("C & D"), "C &amp; D");
    }
}
