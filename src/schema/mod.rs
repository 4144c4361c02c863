use serde::{Deserialize, Serialize};

pub mod course;

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse{
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthResponse{
    pub status: String,
    pub environment: String,
    pub version: String,
}
