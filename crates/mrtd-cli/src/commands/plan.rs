//! Show what a session would do without touching a reader

use mrtd_card::{AccessKeyInputs, DataGroupRequest};

use super::{report_error, SessionArgs};

pub fn cmd_plan(args: &SessionArgs) -> bool {
    let options = args.to_options();

    let inputs = match AccessKeyInputs::from_options(options.bac_key.as_ref()) {
        Ok(inputs) => inputs,
        Err(err) => {
            report_error(err);
            return false;
        }
    };

    let key = inputs.derive_key();
    let request = DataGroupRequest::select(options.include_images(), options.extra_files());

    println!("=== Access Key ===\n");
    println!("Document No:     {}", inputs.document_number());
    println!("Birth Date:      {}", inputs.date_of_birth());
    println!("Expiry Date:     {}", inputs.date_of_expiry());
    println!("MRZ Information: {}", key.mrz_information());
    println!("Key Seed:        {}", hex::encode_upper(key.seed()));

    println!("\n=== Data Groups ({}) ===\n", request.len());
    for (i, group) in request.groups().iter().enumerate() {
        println!("  {}. {} ({})", i + 1, group, group.file_name().unwrap_or("-"));
    }

    true
}
