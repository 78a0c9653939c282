use std::sync::LazyLock;

use prometheus::*;

static METRIC_UPLOAD_COUNT: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!("cs_upload_count", "count of uploaded images").unwrap()
});

static METRIC_SEARCH_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!("cs_search_count", "count of search requests", &["mode"]).unwrap()
});

static METRIC_SEARCH_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "cs_search_duration",
        "duration of a search request in seconds",
        &["mode"]
    )
    .unwrap()
});

/// 增加上传图片计数
pub fn inc_upload_count() {
    METRIC_UPLOAD_COUNT.inc();
}

/// 记录一次搜索请求，mode 为 text 或 image
pub fn observe_search(mode: &str, duration: f32) {
    METRIC_SEARCH_COUNT.with_label_values(&[mode]).inc();
    METRIC_SEARCH_DURATION.with_label_values(&[mode]).observe(duration as f64);
}
