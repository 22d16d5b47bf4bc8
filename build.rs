use std::{
    env, fs,
    io::Write,
    path::{Path, PathBuf},
};

// Keep in sync with `src/routines/mod.rs`: postcard encodes by declaration order.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy)]
enum IRRunMode {
    StopAndResetEncoder,
    RunUsingEncoder,
    RunWithoutEncoder,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
enum IRAction {
    SetRunMode(IRRunMode),
    DriveStraight { inches: f64, speed: f64 },
    Wait(u64),
    Stop,
}
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
struct IRRoutine {
    name: String,
    actions: Vec<IRAction>,
}

const DEFAULT_DRIVE_SPEED: f64 = 0.30;

fn parse_number(s: &str, file: &str, line_no: usize) -> f64 {
    s.trim()
        .parse::<f64>()
        .unwrap_or_else(|_| panic!("{file}:{line_no}: invalid number `{s}`"))
}

fn parse_speed(mut rest: &str, file: &str, line_no: usize) -> f64 {
    let mut speed = DEFAULT_DRIVE_SPEED;
    while let Some(idx) = rest.find('=') {
        let (key_part, value_rest) = rest.split_at(idx);
        let key = key_part.split_whitespace().last().unwrap_or("");
        let value_and_more = &value_rest[1..];
        let end = value_and_more.find(' ');
        let end_idx = end.unwrap_or(value_and_more.len());
        let value = &value_and_more[..end_idx];
        match key {
            "speed" => speed = parse_number(value, file, line_no),
            other => panic!("{file}:{line_no}: unknown attribute `{other}`"),
        }
        if end.is_none() {
            break;
        }
        rest = &value_and_more[end_idx + 1..];
    }
    if !(0.0..=1.0).contains(&speed) {
        panic!("{file}:{line_no}: speed {speed} outside [0, 1]");
    }
    speed
}

fn parse_run_mode(s: &str, file: &str, line_no: usize) -> IRRunMode {
    match s.trim() {
        "stop_and_reset_encoder" => IRRunMode::StopAndResetEncoder,
        "run_using_encoder" => IRRunMode::RunUsingEncoder,
        "run_without_encoder" => IRRunMode::RunWithoutEncoder,
        other => panic!("{file}:{line_no}: unknown run mode `{other}`"),
    }
}

fn parse_routine(name: &str, content: &str) -> IRRoutine {
    let mut actions: Vec<IRAction> = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match command {
            "set_run_mode" => {
                // set_run_mode <mode>
                actions.push(IRAction::SetRunMode(parse_run_mode(rest, name, line_no)));
            }
            "drive_straight" => {
                // drive_straight <inches> [speed=<fraction>]
                let rest = rest.trim();
                let (dist_str, attrs) = rest.split_once(' ').unwrap_or((rest, ""));
                let inches = parse_number(dist_str, name, line_no);
                let speed = parse_speed(attrs, name, line_no);
                actions.push(IRAction::DriveStraight { inches, speed });
            }
            "wait" => {
                // wait <milliseconds>
                let ms: u64 = rest
                    .trim()
                    .parse()
                    .unwrap_or_else(|_| panic!("{name}:{line_no}: invalid milliseconds `{rest}`"));
                actions.push(IRAction::Wait(ms));
            }
            "stop" => actions.push(IRAction::Stop),
            other => panic!("{name}:{line_no}: unknown command `{other}`"),
        }
    }

    IRRoutine {
        name: name.to_string(),
        actions,
    }
}

fn find_routine_files(dir: &Path) -> Vec<PathBuf> {
    let mut res = Vec::new();
    if let Ok(read) = fs::read_dir(dir) {
        for e in read.flatten() {
            let p = e.path();
            if p.extension().and_then(|s| s.to_str()) == Some("routine") {
                if let Some(name) = p.file_name().and_then(|s| s.to_str())
                    && name.starts_with('.')
                {
                    continue;
                }
                res.push(p);
            }
        }
    }
    res.sort();
    res
}

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR"));
    let routines_dir = Path::new("src/routines");
    println!("cargo:rerun-if-changed=src/routines");

    let files = find_routine_files(routines_dir);
    let mut index_src = String::from("pub static ROUTINE_BLOBS: &[(&str, &[u8])] = &[\n");
    for file in files {
        let name = file
            .file_stem()
            .expect("routine file stem")
            .to_string_lossy()
            .to_string();
        println!("cargo:rerun-if-changed={}", file.display());
        let content = fs::read_to_string(&file).expect("read .routine");
        let routine = parse_routine(&name, &content);
        let bytes = postcard::to_allocvec(&routine).expect("serialize routine");
        let out_file = out_dir.join(format!("routine_{name}.bin"));
        fs::write(&out_file, &bytes).expect("write bin");
        index_src.push_str(&format!(
            "    (\"{}\", include_bytes!(concat!(env!(\"OUT_DIR\"), \"/{}\")) as &[u8]),\n",
            name,
            out_file
                .file_name()
                .expect("routine blob name")
                .to_string_lossy()
        ));
    }
    index_src.push_str("];\n");
    let mut f = fs::File::create(out_dir.join("routines_index.rs")).expect("create index");
    f.write_all(index_src.as_bytes()).expect("write index");
}
