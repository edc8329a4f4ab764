pub mod calendar;
pub mod record;

pub use calendar::{week_info, weekday_name, WeekInfo, WeekParity};
pub use record::{parse_document, DocumentError, LessonCandidate, ParsedDocument, RawRecord};
