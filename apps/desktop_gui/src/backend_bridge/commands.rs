//! Backend commands queued from UI to the upload worker.

use shared::domain::StagedFile;

pub enum BackendCommand {
    Encode {
        server_url: String,
        file: StagedFile,
        message: String,
        password: Option<String>,
    },
    Decode {
        server_url: String,
        file: StagedFile,
        password: Option<String>,
    },
}
