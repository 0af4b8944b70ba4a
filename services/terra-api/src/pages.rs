//! Server-rendered HTML pages.
//!
//! Pages are assembled from strings; every value coming from the catalog or
//! from a request goes through [`escape_html`].

use terra_common::{build_legend, DatasetDescriptor, Registry, DATE_FORMAT};

use crate::pipeline::RenderedImage;

const STYLESHEET: &str = "/static/style.css";
const VIEWER_SCRIPT: &str = "/static/viewer.js";

/// Escape text for use in element content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body_class: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <link rel="stylesheet" href="{css}">
</head>
<body class="{body_class}">
{body}
</body>
</html>
"#,
        title = escape_html(title),
        css = STYLESHEET,
        body_class = body_class,
        body = body,
    )
}

/// Dataset gallery grouped by category.
pub fn gallery(registry: &Registry) -> String {
    let mut body = String::from(
        "<header><h1>TerraSight</h1><p>Explorez les données Earth Engine</p></header>\n<main>\n",
    );

    for category in registry.categories() {
        body.push_str(&format!(
            "<section class=\"category\" id=\"{}\">\n<h2>{}</h2>\n<div class=\"cards\">\n",
            escape_html(&category.id),
            escape_html(&category.label)
        ));
        for dataset in &category.datasets {
            body.push_str(&dataset_card(dataset));
        }
        body.push_str("</div>\n</section>\n");
    }

    body.push_str("</main>");
    layout("TerraSight - Galerie", "gallery", &body)
}

fn dataset_card(dataset: &DatasetDescriptor) -> String {
    let coverage = match &dataset.date_range {
        Some(range) => format!(
            "{} → {}",
            range.start.format(DATE_FORMAT),
            range.end.format(DATE_FORMAT)
        ),
        None => "Données statiques".to_string(),
    };

    format!(
        r#"<article class="card">
  <h3>{name}</h3>
  <p>{description}</p>
  <p class="meta">{variables} variable(s) · {coverage}</p>
  <a class="button" href="/viewer?dataset={id}">Explorer</a>
</article>
"#,
        name = escape_html(&dataset.name),
        description = escape_html(&dataset.description),
        variables = dataset.variables.len(),
        coverage = escape_html(&coverage),
        id = escape_html(&dataset.id),
    )
}

/// Parameter selection page for one dataset.
pub fn viewer(dataset: &DatasetDescriptor) -> String {
    let mut options = String::new();
    for variable in &dataset.variables {
        options.push_str(&format!(
            "<option value=\"{}\">{}</option>\n",
            escape_html(&variable.id),
            escape_html(&variable.name)
        ));
    }

    let date_field = if dataset.is_temporal() {
        let value = dataset
            .default_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        let (min, max) = dataset
            .date_range
            .as_ref()
            .map(|r| {
                (
                    r.start.format(DATE_FORMAT).to_string(),
                    r.end.format(DATE_FORMAT).to_string(),
                )
            })
            .unwrap_or_default();
        format!(
            "<label for=\"date\">Date</label>\n<input type=\"date\" id=\"date\" value=\"{}\" min=\"{}\" max=\"{}\">\n",
            value, min, max
        )
    } else {
        "<p class=\"meta\">Données statiques</p>\n<input type=\"hidden\" id=\"date\" value=\"\">\n"
            .to_string()
    };

    let body = format!(
        r#"<header><a href="/">← Galerie</a><h1>{name}</h1><p>{description}</p></header>
<main id="viewer" data-dataset="{id}" data-zoom="{zoom}" data-center-lon="{lon}" data-center-lat="{lat}">
<aside class="controls">
<label for="variable">Variable</label>
<select id="variable">
{options}</select>
{date_field}<button id="update-map" type="button">Afficher</button>
<a id="fullscreen" class="button" href="/static_image?dataset={id}">Plein écran</a>
<div id="status" class="status"></div>
<div id="legend" class="legend"></div>
</aside>
<section class="image-container">
<div id="loading" class="loading">Chargement…</div>
<img id="image" alt="">
</section>
</main>
<script src="{script}"></script>"#,
        name = escape_html(&dataset.name),
        description = escape_html(&dataset.description),
        id = escape_html(&dataset.id),
        zoom = dataset.default_zoom,
        lon = dataset.default_center.lon,
        lat = dataset.default_center.lat,
        options = options,
        date_field = date_field,
        script = VIEWER_SCRIPT,
    );

    layout(&format!("TerraSight - {}", dataset.name), "viewer", &body)
}

/// Full-page image with its legend.
pub fn static_image(rendered: &RenderedImage) -> String {
    let vis = &rendered.result.vis_params;
    let mut legend = String::new();
    for entry in build_legend(vis) {
        legend.push_str(&format!(
            "<div class=\"legend-item\"><span class=\"swatch\" style=\"background-color: {}\"></span><span>{}</span></div>\n",
            escape_html(&entry.color),
            entry.label()
        ));
    }

    let date_text = match rendered.date_str() {
        Some(date) => format!("Date: {}", date),
        None => "Données statiques".to_string(),
    };

    let body = format!(
        r#"<div class="image-container">
<img src="{url}" alt="{variable_name}">
</div>
<div class="info-panel">
<h2>{dataset_name}</h2>
<p>Dataset: {id}</p>
<p>{variable_name}</p>
<p>{date_text}</p>
<div class="legend">
<h3>{variable_name}</h3>
{legend}</div>
<a class="button" href="/viewer?dataset={id}">Retour à la visionneuse</a>
<a class="button" href="/">Accueil</a>
</div>"#,
        url = escape_html(&rendered.result.image_url),
        variable_name = escape_html(&rendered.result.variable_name),
        dataset_name = escape_html(&rendered.dataset.name),
        date_text = escape_html(&date_text),
        legend = legend,
        id = escape_html(&rendered.dataset.id),
    );

    layout(
        &format!("{} - {}", rendered.dataset.name, rendered.result.variable_name),
        "static-image",
        &body,
    )
}

/// Error page shown by the HTML routes.
pub fn error_page(status: u16, message: &str) -> String {
    let body = format!(
        "<main class=\"error\">\n<h1>Erreur {}</h1>\n<p>{}</p>\n<a class=\"button\" href=\"/\">Retour à la galerie</a>\n</main>",
        status,
        escape_html(message)
    );
    layout("TerraSight - Erreur", "error", &body)
}
