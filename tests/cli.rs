//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::fs;

    use assert_cmd::Command;
    use tempfile::tempdir;

    fn transamp() -> Command {
        let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
        cmd.env_remove("TRANSAMP_CLASS_PREFIX")
            .env_remove("TRANSAMP_REMOVE_CHILDREN")
            .env_remove("TRANSAMP_KEEP_CHILDREN_TAGS")
            .env_remove("TRANSAMP_REMOVE_CHILDREN_TAGS");
        cmd
    }

    #[test]
    fn stdin_to_stdout() {
        transamp()
            .write_stdin("<p style=\"color:red\" onclick=\"x()\">Hi</p><custom>x</custom>")
            .assert()
            .success()
            .stdout("<p class=\"saniamp0\">Hi</p>");
    }

    #[test]
    fn dash_reads_stdin() {
        transamp()
            .arg("-")
            .write_stdin("<b>bold</b>")
            .assert()
            .success()
            .stdout("<b>bold</b>");
    }

    #[test]
    fn json_output() {
        let out = transamp()
            .arg("--json")
            .write_stdin("<p style=\"color:red\">Hi</p>")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["html"], "<p class=\"saniamp0\">Hi</p>");
        assert_eq!(json["styles"], ".saniamp0{color:red;}");
    }

    #[test]
    fn styles_written_to_file() {
        let dir = tempdir().unwrap();
        let styles = dir.path().join("styles.css");

        transamp()
            .arg("--styles")
            .arg(&styles)
            .arg("--class-prefix")
            .arg("x")
            .write_stdin("<p style=\"margin:0\">a</p>")
            .assert()
            .success()
            .stdout("<p class=\"x0\">a</p>");

        assert_eq!(fs::read_to_string(&styles).unwrap(), ".x0{margin:0;}");
    }

    #[test]
    fn file_input_and_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.html");
        let output = dir.path().join("output.html");
        fs::write(&input, b"<p>caf\xe9</p>").unwrap();

        transamp()
            .arg(&input)
            .arg("-e")
            .arg("windows-1252")
            .arg("-o")
            .arg(&output)
            .assert()
            .success()
            .stdout("");

        assert_eq!(fs::read_to_string(&output).unwrap(), "<p>caf\u{e9}</p>");
    }

    #[test]
    fn keep_children_flag() {
        transamp()
            .arg("--keep-children")
            .write_stdin("<custom><i>kept</i></custom>")
            .assert()
            .success()
            .stdout("<i>kept</i>");
    }

    #[test]
    fn class_prefix_from_env() {
        transamp()
            .env("TRANSAMP_CLASS_PREFIX", "env")
            .write_stdin("<p style=\"color:red\">a</p>")
            .assert()
            .success()
            .stdout("<p class=\"env0\">a</p>");
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use assert_cmd::Command;

    fn transamp() -> Command {
        Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
    }

    #[test]
    fn missing_input_file() {
        let assert = transamp()
            .arg("/nonexistent/transamp/input.html")
            .assert()
            .failure()
            .code(1);

        let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
        assert!(stderr.contains("could not read input"));
    }

    #[test]
    fn timeout_out_of_range() {
        transamp()
            .args(["--timeout", "0"])
            .write_stdin("<p>x</p>")
            .assert()
            .failure()
            .code(2);
    }

    #[test]
    fn json_conflicts_with_styles() {
        transamp()
            .args(["--json", "--styles", "out.css"])
            .write_stdin("<p>x</p>")
            .assert()
            .failure()
            .code(2);
    }

    #[test]
    fn invalid_env_value_is_ignored() {
        transamp()
            .env("TRANSAMP_REMOVE_CHILDREN", "maybe")
            .env_remove("TRANSAMP_CLASS_PREFIX")
            .write_stdin("<custom>gone</custom><p>x</p>")
            .assert()
            .success()
            .stdout("<p>x</p>");
    }

    #[test]
    fn invalid_env_value_is_reported() {
        let assert = transamp()
            .env("TRANSAMP_REMOVE_CHILDREN", "maybe")
            .env("TRANSAMP_PROBE_TIMEOUT", "forever")
            .args(["--log-level", "warn"])
            .write_stdin("<p>x</p>")
            .assert()
            .success()
            .stdout("<p>x</p>");

        let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
        assert!(stderr.contains("TRANSAMP_REMOVE_CHILDREN"));
        assert!(stderr.contains("TRANSAMP_PROBE_TIMEOUT"));
    }
}
