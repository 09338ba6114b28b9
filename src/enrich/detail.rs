//! Product detail page parser
//!
//! Every field is extracted independently. A block that is missing or does
//! not have the expected shape leaves its field unknown (or empty for lists)
//! without affecting the others.

use super::pricing::round2;
use crate::model::PackagingMetrics;
use crate::source::html::{element_text, selector};
use scraper::{ElementRef, Html, Selector};

/// Fields read from a product detail page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailPage {
    pub long_description: Option<String>,
    pub materials: Option<String>,
    pub image_urls: Vec<String>,
    pub product_parts: Vec<u64>,
    pub packaging: PackagingMetrics,
    pub multi_pack: bool,
}

/// Labels of the measurement rows in a package container
const WIDTH_LABEL: &str = "Širina";
const HEIGHT_LABEL: &str = "Visina";
const LENGTH_LABEL: &str = "Dužina";
const WEIGHT_LABEL: &str = "Težina";
const PACKAGES_LABEL: &str = "Pakovanje";

/// Parses a detail page; never fails as a whole
pub fn parse_detail_page(html: &str) -> DetailPage {
    let document = Html::parse_document(html);
    let (product_parts, packaging) = packaging(&document);

    DetailPage {
        long_description: long_description(&document),
        materials: materials(&document),
        image_urls: image_urls(&document),
        product_parts,
        packaging,
        multi_pack: exists(&document, "div.pip-product-dimensions__multi-pack"),
    }
}

fn exists(document: &Html, css: &str) -> bool {
    selector(css)
        .map(|s| document.select(&s).next().is_some())
        .unwrap_or(false)
}

fn long_description(document: &Html) -> Option<String> {
    let container_selector = selector("div.pip-product-details__container").ok()?;
    let paragraph_selector = selector("p.pip-product-details__paragraph").ok()?;

    let container = document.select(&container_selector).next()?;
    let paragraphs: Vec<String> = container
        .select(&paragraph_selector)
        .map(|p| element_text(&p).trim().to_string())
        .collect();

    if paragraphs.is_empty() {
        tracing::debug!("Detail container has no description paragraphs");
        return None;
    }
    Some(paragraphs.join("\n\n"))
}

/// Material lines follow the material header in the first `div` after it
fn materials(document: &Html) -> Option<String> {
    let header_selector = selector("span.pip-product-details__material-header").ok()?;
    let dl_selector = selector("dl").ok()?;
    let dt_selector = selector("dt").ok()?;
    let dd_selector = selector("dd").ok()?;

    let header = document.select(&header_selector).next()?;
    let container = document
        .tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != header.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "div")?;

    let mut lines = Vec::new();
    for dl in container.select(&dl_selector) {
        let definition = dl.select(&dd_selector).next().map(|dd| element_text(&dd));
        let Some(definition) = definition else {
            tracing::debug!("Material entry without a definition");
            return None;
        };
        match dl.select(&dt_selector).next() {
            Some(term) => lines.push(format!(
                "{} {}",
                element_text(&term).trim(),
                definition.trim()
            )),
            None => lines.push(definition.trim().to_string()),
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Image sources of the first media grid
fn image_urls(document: &Html) -> Vec<String> {
    let (Ok(grid_selector), Ok(img_selector)) =
        (selector("div.pip-media-grid__grid"), selector("img"))
    else {
        return Vec::new();
    };

    document
        .select(&grid_selector)
        .next()
        .map(|grid| {
            grid.select(&img_selector)
                .filter_map(|img| img.value().attr("src"))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Measurements of one package; each is unknown until its row is read
#[derive(Debug, Default)]
struct PackageMeasurements {
    width: Option<f64>,
    height: Option<f64>,
    length: Option<f64>,
    weight: Option<f64>,
    count: u32,
}

impl PackageMeasurements {
    fn volume(&self) -> Option<f64> {
        match (self.width, self.height, self.length) {
            (Some(w), Some(h), Some(l)) if w > 0.0 && h > 0.0 && l > 0.0 => Some(w * h * l),
            _ => None,
        }
    }

    fn longest_side(&self) -> f64 {
        [self.width, self.height, self.length]
            .into_iter()
            .flatten()
            .fold(0.0, f64::max)
    }
}

struct PackageSelectors {
    container: Selector,
    identifier: Selector,
    measurements: Selector,
    row: Selector,
}

impl PackageSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            container: selector("div.pip-product-dimensions__package-container").ok()?,
            identifier: selector("span.pip-product-identifier span.pip-product-identifier__value")
                .ok()?,
            measurements: selector("div.pip-product-dimensions__measurement-container").ok()?,
            row: selector("p").ok()?,
        })
    }
}

fn packaging(document: &Html) -> (Vec<u64>, PackagingMetrics) {
    let Some(selectors) = PackageSelectors::new() else {
        return (Vec::new(), PackagingMetrics::default());
    };

    let mut parts = Vec::new();
    let mut volume_total = 0.0;
    let mut weight_total = 0.0;
    let mut max_dimension: f64 = 0.0;
    let mut packages = 0u32;

    for container in document.select(&selectors.container) {
        match container
            .select(&selectors.identifier)
            .next()
            .and_then(|span| part_id(&element_text(&span)))
        {
            Some(id) => parts.push(id),
            None => tracing::debug!("Package container without a readable part id"),
        }

        let package = container
            .select(&selectors.measurements)
            .next()
            .map(|m| read_measurements(m, &selectors.row))
            .unwrap_or_default();

        max_dimension = max_dimension.max(package.longest_side());
        if let Some(volume) = package.volume() {
            volume_total += volume;
        }
        if let Some(weight) = package.weight.filter(|w| *w > 0.0) {
            weight_total += weight;
        }
        packages += package.count;
    }

    let metrics = PackagingMetrics {
        num_of_packages: (packages > 0).then_some(packages),
        sum_volume: (volume_total > 0.0).then(|| round2(volume_total)),
        sum_weight: (weight_total > 0.0).then(|| round2(weight_total)),
        max_dimension: (max_dimension > 0.0).then_some(max_dimension),
    };

    (parts, metrics)
}

fn read_measurements(container: ElementRef<'_>, row_selector: &Selector) -> PackageMeasurements {
    let mut package = PackageMeasurements::default();

    for row in container.select(row_selector) {
        let label = element_text(&row);
        let Some(value) = row_value(&row) else {
            continue;
        };

        if label.contains(WIDTH_LABEL) {
            package.width = centimetres_to_metres(&value);
        } else if label.contains(HEIGHT_LABEL) {
            package.height = centimetres_to_metres(&value);
        } else if label.contains(LENGTH_LABEL) {
            package.length = centimetres_to_metres(&value);
        } else if label.contains(WEIGHT_LABEL) {
            package.weight = parse_number(&value);
        } else if label.contains(PACKAGES_LABEL) {
            package.count += value.parse::<u32>().unwrap_or(0);
        }
    }

    package
}

/// First token of the row content that follows the label node
fn row_value(row: &ElementRef<'_>) -> Option<String> {
    let mut text = String::new();
    for node in row.children().skip(1) {
        if let Some(t) = node.value().as_text() {
            text.push_str(t);
        } else if let Some(element) = ElementRef::wrap(node) {
            text.push_str(&element_text(&element));
        }
    }
    text.split_whitespace().next().map(str::to_string)
}

fn parse_number(token: &str) -> Option<f64> {
    token.replace(',', ".").parse::<f64>().ok()
}

fn centimetres_to_metres(token: &str) -> Option<f64> {
    parse_number(token).map(|cm| cm / 100.0)
}

/// Part ids are printed with `.` separators and leading zeros
fn part_id(text: &str) -> Option<u64> {
    let digits = text.trim().replace('.', "");
    digits.trim_start_matches('0').parse().ok()
}
