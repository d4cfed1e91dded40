pub mod plan;
pub mod read;
pub mod supported;

use clap::Args;
use mrtd_card::{BacKeyOptions, ReadOptions, SessionError};

/// BAC key fields and data group selection shared by `plan` and `read`
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Document number as printed in the MRZ
    #[arg(long)]
    pub document_no: Option<String>,

    /// Date of birth (YYYY-MM-DD or YYYYMMDD)
    #[arg(long)]
    pub birth_date: Option<String>,

    /// Date of expiry (YYYY-MM-DD or YYYYMMDD)
    #[arg(long)]
    pub expiry_date: Option<String>,

    /// Also read the face (DG2) and fingerprint (DG5) groups
    #[arg(long)]
    pub include_images: bool,

    /// Extra file to read, e.g. EF_DG14 (repeatable)
    #[arg(long = "extra-file", value_name = "NAME")]
    pub extra_files: Vec<String>,
}

impl SessionArgs {
    /// Build the options a host bridge would pass.
    ///
    /// Omitting every BAC flag leaves `bacKey` out entirely; the session
    /// core reports that as a missing key.
    pub fn to_options(&self) -> ReadOptions {
        let bac_key = if self.document_no.is_none()
            && self.birth_date.is_none()
            && self.expiry_date.is_none()
        {
            None
        } else {
            Some(BacKeyOptions {
                document_no: self.document_no.clone(),
                expiry_date: self.expiry_date.clone(),
                birth_date: self.birth_date.clone(),
            })
        };

        ReadOptions {
            bac_key,
            include_images: Some(self.include_images),
            extra_files: Some(self.extra_files.clone()),
        }
    }
}

/// Print a session error the way the host bridge reports it
pub(crate) fn report_error(err: SessionError) {
    eprintln!("{}: {}", err.code(), err);
}
