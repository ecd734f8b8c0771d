//! HTTP 越しの結合テスト（httpmock でベンダー API を立てる）
