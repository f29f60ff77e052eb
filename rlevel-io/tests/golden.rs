use serde_json::Value;
use std::fs;
use std::path::PathBuf;

use rlevel_io::MemoryStore;

pub const SERVER_CONFIG: &str = "config/game/rtype.json";
pub const CLIENT_CONFIG: &str = "config/game/client-rtype.json";

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

/// 以测试注册表作为服务端与编辑器游戏配置的内存存储。
pub fn registry_store() -> MemoryStore {
    let registry = fs::read_to_string(fixture("rtype.json")).expect("读取测试注册表失败");
    MemoryStore::new().with_file(SERVER_CONFIG, registry)
}

pub fn assert_golden(name: &str, actual: &str) {
    let snapshot: Value = serde_json::from_str(actual).expect("输出不是合法 JSON");
    let base_dir = fixture("golden");
    if let Err(err) = fs::create_dir_all(&base_dir) {
        panic!("无法创建黄金数据目录 {}: {err}", base_dir.display());
    }
    let golden_path = base_dir.join(format!("{name}.json"));

    if !golden_path.exists() {
        fs::write(&golden_path, actual)
            .unwrap_or_else(|err| panic!("写入黄金文件 {} 失败: {err}", golden_path.display()));
        panic!(
            "黄金文件 {} 不存在，已自动生成。请确认内容后重新运行测试。",
            golden_path.display()
        );
    }

    let expected_str = fs::read_to_string(&golden_path)
        .unwrap_or_else(|err| panic!("读取黄金文件 {} 失败: {err}", golden_path.display()));
    let expected: Value = serde_json::from_str(&expected_str)
        .unwrap_or_else(|err| panic!("解析黄金文件 {} 失败: {err}", golden_path.display()));

    if expected != snapshot {
        let diff_path = base_dir.join(format!("{name}.actual.json"));
        fs::write(&diff_path, actual).expect("写入差异文件失败");
        panic!(
            "黄金文件 {} 与当前输出不一致。已生成对照输出 {}。",
            golden_path.display(),
            diff_path.display()
        );
    }
}
