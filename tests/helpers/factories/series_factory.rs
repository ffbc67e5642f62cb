use crate::engine::series::Series;

pub struct SeriesFactory {
    table: String,
    measurement: String,
    tags: Vec<String>,
    field: String,
    day: String,
}

impl SeriesFactory {
    pub fn new() -> Self {
        Self {
            table: "series_double".into(),
            measurement: "cpu".into(),
            tags: vec!["hostname=host_0".into()],
            field: "usage_user".into(),
            day: "2016-01-01".into(),
        }
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_measurement(mut self, measurement: &str) -> Self {
        self.measurement = measurement.into();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_field(mut self, field: &str) -> Self {
        self.field = field.into();
        self
    }

    pub fn with_day(mut self, day: &str) -> Self {
        self.day = day.into();
        self
    }

    pub fn id(&self) -> String {
        let mut head = self.measurement.clone();
        for tag in &self.tags {
            head.push(',');
            head.push_str(tag);
        }
        format!("{}#{}#{}", head, self.field, self.day)
    }

    pub fn create(self) -> Series {
        Series::parse(&self.table, &self.id()).expect("factory series id should parse")
    }
}
