use dymo_label_gen::config::Config;
use dymo_label_gen::services::NamingPattern;
use dymo_label_gen::{App, RunOutcome};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TEMPLATE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<DieCutLabel>
  <String>{{Code}}</String>
  <String>{{Desc}}</String>
  <String>{{Color}} / {{Size}}</String>
</DieCutLabel>
"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("创建临时目录失败"),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, body: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, body).expect("写入测试文件失败");
        path
    }

    fn config(&self, data_csv: &str) -> Config {
        let template = self.write("template.dymo", TEMPLATE);
        let data = self.write("data.csv", data_csv);
        let mut config = Config::new(template, data);
        config.out_dir = self.path("out");
        config
    }
}

fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("读取输出目录失败")
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn rows_csv(count: usize) -> String {
    let mut csv = String::from("Code,Desc,Color,Size\n");
    for i in 1..=count {
        csv.push_str(&format!("C{:03},Maglia {},Blu,M\n", i, i));
    }
    csv
}

#[tokio::test]
async fn test_full_batch_writes_one_file_per_row() {
    let ws = Workspace::new();
    let config = ws.config(&rows_csv(4));

    let report = App::initialize(config).await.unwrap().run().await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.written_count(), 4);
    assert_eq!(
        list_files(&ws.path("out")),
        vec![
            "C001_Blu_M.dymo",
            "C002_Blu_M.dymo",
            "C003_Blu_M.dymo",
            "C004_Blu_M.dymo"
        ]
    );

    let body = fs::read_to_string(ws.path("out").join("C003_Blu_M.dymo")).unwrap();
    assert!(body.contains("<String>C003</String>"));
    assert!(body.contains("<String>Maglia 3</String>"));
    assert!(body.contains("<String>Blu / M</String>"));
    assert!(!body.contains("{{"));

    let out_dir = report.out_dir.as_ref().unwrap();
    assert!(out_dir.is_absolute());
    assert!(report.renamed().next().is_none());
}

#[tokio::test]
async fn test_dry_run_with_limit_writes_nothing() {
    let ws = Workspace::new();
    let mut config = ws.config(&rows_csv(10));
    config.limit = Some(5);
    config.dry_run = true;

    let app = App::initialize(config).await.unwrap();
    assert_eq!(app.data().len(), 5);

    let report = app.run().await.unwrap();
    assert_eq!(report.outcome, RunOutcome::DryRun);
    assert_eq!(report.rows, 5);
    assert_eq!(report.written_count(), 0);

    let sample = report.sample.unwrap();
    assert_eq!(sample.file_name, "C001_Blu_M.dymo");
    assert!(sample.snippet.contains("C001"));
    assert!(!sample.snippet.contains('\n'));

    // 不创建输出目录
    assert!(!ws.path("out").exists());
}

#[tokio::test]
async fn test_empty_data_is_a_clean_no_op() {
    let ws = Workspace::new();
    let config = ws.config("Code,Desc,Color,Size\n");

    let report = App::initialize(config).await.unwrap().run().await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Empty);
    assert_eq!(report.written_count(), 0);
    assert!(!ws.path("out").exists());
}

#[tokio::test]
async fn test_fatal_errors_before_any_write() {
    let ws = Workspace::new();

    // 模板不存在
    let mut config = ws.config(&rows_csv(1));
    config.template_path = ws.path("missing.dymo");
    assert!(App::initialize(config).await.is_err());

    // 数据不存在
    let mut config = ws.config(&rows_csv(1));
    config.data_path = ws.path("missing.csv");
    assert!(App::initialize(config).await.is_err());

    // 不支持的格式
    let mut config = ws.config(&rows_csv(1));
    config.data_path = ws.write("data.json", "{}");
    let err = App::initialize(config).await.err().unwrap();
    assert!(format!("{:#}", err).contains("不支持的数据格式"));

    assert!(!ws.path("out").exists());
}

#[tokio::test]
async fn test_missing_placeholder_is_left_verbatim() {
    let ws = Workspace::new();
    let mut config = ws.config("Code,Desc,Size,Extra\nA1,Felpa,L,x\n");
    config.name_pattern = NamingPattern::parse("{Code}.dymo").unwrap();

    let report = App::initialize(config).await.unwrap().run().await.unwrap();

    assert_eq!(report.schema.missing, vec!["Color"]);
    assert_eq!(report.schema.unused, vec!["Extra"]);
    assert!(!report.schema.is_valid);

    let body = fs::read_to_string(ws.path("out").join("A1.dymo")).unwrap();
    assert!(body.contains("<String>{{Color}} / L</String>"));
}

#[tokio::test]
async fn test_values_are_xml_escaped() {
    let ws = Workspace::new();
    let config = ws.config("Code,Desc,Color,Size\nA1,\"Tom & \"\"Jerry\"\" <3\",Blu,M\n");

    App::initialize(config).await.unwrap().run().await.unwrap();

    let body = fs::read_to_string(ws.path("out").join("A1_Blu_M.dymo")).unwrap();
    assert!(body.contains("<String>Tom &amp; &quot;Jerry&quot; &lt;3</String>"));
}

#[tokio::test]
async fn test_colliding_names_are_disambiguated() {
    let ws = Workspace::new();
    let config = ws.config("Code,Desc,Color,Size\nA1,first,Blu,M\nA1,second,Blu,M\nA/1,third,Blu,M\n");

    let report = App::initialize(config).await.unwrap().run().await.unwrap();

    assert_eq!(report.written_count(), 3);
    assert_eq!(
        list_files(&ws.path("out")),
        vec!["A-1_Blu_M.dymo", "A1_Blu_M.dymo", "A1_Blu_M_2.dymo"]
    );

    let renamed: Vec<_> = report.renamed().collect();
    assert_eq!(renamed.len(), 1);
    assert_eq!(renamed[0].row_index, 2);
    assert_eq!(renamed[0].renamed_from.as_deref(), Some("A1_Blu_M.dymo"));

    let first = fs::read_to_string(ws.path("out").join("A1_Blu_M.dymo")).unwrap();
    let second = fs::read_to_string(ws.path("out").join("A1_Blu_M_2.dymo")).unwrap();
    assert!(first.contains("first"));
    assert!(second.contains("second"));
}

#[tokio::test]
async fn test_unresolved_name_field_uses_fallback() {
    let ws = Workspace::new();
    let mut config = ws.config(&rows_csv(2));
    config.name_pattern = NamingPattern::parse("{Brand}_{Code}.dymo").unwrap();

    let report = App::initialize(config).await.unwrap().run().await.unwrap();

    assert_eq!(report.fallback_rows, vec![1, 2]);
    assert_eq!(
        list_files(&ws.path("out")),
        vec!["label_1.dymo", "label_2.dymo"]
    );
}

#[tokio::test]
async fn test_row_index_in_pattern() {
    let ws = Workspace::new();
    let mut config = ws.config("Code,Desc,Color,Size,i\nA1,x,Blu,M,ignored\nA2,y,Blu,M,ignored\n");
    config.name_pattern = NamingPattern::parse("{i}_{Code}.dymo").unwrap();

    App::initialize(config).await.unwrap().run().await.unwrap();

    assert_eq!(
        list_files(&ws.path("out")),
        vec!["1_A1.dymo", "2_A2.dymo"]
    );
}

#[tokio::test]
async fn test_zip_archive_of_outputs() {
    let ws = Workspace::new();
    let mut config = ws.config(&rows_csv(3));
    config.zip_path = Some(ws.path("labels.zip"));

    let report = App::initialize(config).await.unwrap().run().await.unwrap();

    assert_eq!(report.archive, Some(ws.path("labels.zip")));
    let archive = zip::ZipArchive::new(fs::File::open(ws.path("labels.zip")).unwrap()).unwrap();
    assert_eq!(archive.len(), 3);
}

#[tokio::test]
async fn test_barcode_merge_and_group_filter() {
    let ws = Workspace::new();
    let template = ws.write("template.dymo", "<Barcode>{{Barcode}}</Barcode><Text>{{Code}}</Text>");
    let data = ws.write(
        "data.csv",
        "Code,Color,Size,Group\nA1,Blu,M,Estate\nB2,Rosso,S,Inverno\nC3,Verde,L,Estate\n",
    );
    let barcodes = ws.write("ean.csv", "Code,Barcode\nA1,8001234567890\nC3,8009876543210\n");

    let mut config = Config::new(template, data);
    config.out_dir = ws.path("out");
    config.ean_data_path = Some(barcodes);
    config.groups = vec!["Estate".to_string()];
    config.unique_column = Some("Barcode".to_string());

    let report = App::initialize(config).await.unwrap().run().await.unwrap();

    let merge = report.merge.unwrap();
    assert_eq!((merge.total, merge.matched, merge.unmatched), (3, 2, 1));
    assert!(report.uniqueness.as_ref().unwrap().is_clean());
    assert_eq!(report.written_count(), 2);

    let body = fs::read_to_string(ws.path("out").join("C3_Verde_L.dymo")).unwrap();
    assert_eq!(body, "<Barcode>8009876543210</Barcode><Text>C3</Text>");
}

#[tokio::test]
async fn test_group_filter_requires_group_column() {
    let ws = Workspace::new();
    let mut config = ws.config(&rows_csv(2));
    config.groups = vec!["Estate".to_string()];

    assert!(App::initialize(config).await.is_err());
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let ws = Workspace::new();
    let mut config = ws.config(&rows_csv(1));
    config.dry_run = true;

    let report = App::initialize(config).await.unwrap().run().await.unwrap();
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();

    assert_eq!(json["outcome"], "dry_run");
    assert_eq!(json["rows"], 1);
    assert_eq!(json["schema"]["is_valid"], true);
    assert_eq!(json["sample"]["file_name"], "C001_Blu_M.dymo");
}

#[tokio::test]
async fn test_long_multibyte_name_does_not_abort_batch() {
    let ws = Workspace::new();
    let long_code = "漢".repeat(200);
    let config = ws.config(&format!(
        "Code,Desc,Color,Size\nA1,x,Blu,M\n{},y,Blu,M\nA3,z,Blu,M\n",
        long_code
    ));

    let report = App::initialize(config).await.unwrap().run().await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.written_count(), 3);
    let long_name = &report.written[1].file_name;
    assert!(long_name.len() <= 240);
    assert!(long_name.ends_with(".dymo"));
    assert!(ws.path("out").join(long_name).is_file());
    assert!(ws.path("out").join("A3_Blu_M.dymo").is_file());
}

#[tokio::test]
async fn test_unusable_zip_target_fails_before_writing() {
    let ws = Workspace::new();
    let mut config = ws.config(&rows_csv(2));
    let existing_dir = ws.path("already-a-dir");
    fs::create_dir_all(&existing_dir).unwrap();
    config.zip_path = Some(existing_dir);

    assert!(App::initialize(config).await.is_err());
    assert!(!ws.path("out").exists());

    // 上级路径是普通文件
    let mut config = ws.config(&rows_csv(2));
    let blocker = ws.write("blocker", "x");
    config.zip_path = Some(blocker.join("labels.zip"));

    assert!(App::initialize(config).await.is_err());
    assert!(!ws.path("out").exists());
}
