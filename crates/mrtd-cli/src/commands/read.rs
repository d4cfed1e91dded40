//! Run a full session against a captured document

use std::path::Path;

use tracing::info;

use crate::formatters::{format_record, FormatMode};
use crate::replay::ReplayReader;

use super::{report_error, SessionArgs};

pub async fn cmd_read(args: &SessionArgs, replay: &Path, format_mode: FormatMode) -> bool {
    let reader = match ReplayReader::from_path(replay) {
        Ok(reader) => reader,
        Err(err) => {
            eprintln!("Failed to load capture {}: {}", replay.display(), err);
            return false;
        }
    };
    info!(capture = %replay.display(), "Loaded capture");

    let options = args.to_options();
    let outcome = mrtd_card::start_reading(&reader, &options, |message| {
        eprintln!("{}", message);
    })
    .await;

    let record = match outcome {
        Ok(record) => record,
        Err(err) => {
            report_error(err);
            return false;
        }
    };

    match format_record(&record, format_mode) {
        Ok(output) => {
            println!("{}", output);
            true
        }
        Err(err) => {
            eprintln!("Failed to format result: {}", err);
            false
        }
    }
}
