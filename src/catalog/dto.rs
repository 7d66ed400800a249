use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandResponse {
    pub id: i32,
    pub logo: String,
    pub name: String,
    /// Number of series under this brand.
    pub count: usize,
    pub series: Vec<SeriesResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesResponse {
    pub id: i32,
    pub name: String,
    /// Number of models under this series.
    pub count: usize,
    pub models: Vec<ModelResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelResponse {
    pub id: i32,
    pub name: String,
    // siblings in the same series, including itself
    pub count: usize,
}
