use crate::types::Violation;
use failure::Error;
use scraper::{Html, Selector};

/// Black-box parser turning the raw results markup into structured records.
pub trait ViolationExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Result<Vec<Violation>, Error>;
}

/// Extractor for the upstream site's results page. The page renders each
/// violation as a run of label/value rows; a new "Thời gian vi phạm" label
/// starts the next record.
pub struct CsgtExtractor;

const DATE_LABEL: &str = "Thời gian vi phạm";
const LOCATION_LABEL: &str = "Địa điểm vi phạm";
const DESCRIPTION_LABEL: &str = "Hành vi vi phạm";

#[derive(Default)]
struct Partial {
    date: Option<String>,
    location: Option<String>,
    description: Option<String>,
}

impl Partial {
    fn is_empty(&self) -> bool {
        self.date.is_none() && self.location.is_none() && self.description.is_none()
    }

    fn finish(self) -> Violation {
        Violation {
            date: self.date.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        }
    }
}

impl ViolationExtractor for CsgtExtractor {
    fn extract(&self, html: &str) -> Result<Vec<Violation>, Error> {
        let document = Html::parse_document(html);
        let row_selector = Selector::parse(".form-group").expect("invalid row selector");
        let label_selector = Selector::parse("label").expect("invalid label selector");
        let value_selector = Selector::parse(".col-md-9").expect("invalid value selector");

        let mut violations = Vec::new();
        let mut current = Partial::default();
        for row in document.select(&row_selector) {
            let label = match row.select(&label_selector).next() {
                Some(l) => l.text().collect::<String>(),
                None => continue,
            };
            let value = match row.select(&value_selector).next() {
                Some(v) => v.text().collect::<String>().trim().to_string(),
                None => continue,
            };
            if label.contains(DATE_LABEL) {
                if !current.is_empty() {
                    violations.push(std::mem::take(&mut current).finish());
                }
                current.date = Some(value);
            } else if label.contains(LOCATION_LABEL) {
                current.location = Some(value);
            } else if label.contains(DESCRIPTION_LABEL) {
                current.description = Some(value);
            }
        }
        if !current.is_empty() {
            violations.push(current.finish());
        }
        Ok(violations)
    }
}
