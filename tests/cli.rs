// tests/cli.rs

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Cada prueba trabaja con su propio directorio de configuración.
fn just(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("just").unwrap();
    cmd.env("JUST_EXT_HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

fn add(home: &TempDir, declaration: &str, template: &[&str]) {
    just(home)
        .args(["ext", "add", "-d", declaration])
        .args(template)
        .assert()
        .success()
        .stdout(predicate::str::contains("guardada"));
}

#[test]
fn add_then_dry_run_with_defaults_and_values() {
    let home = tempfile::tempdir().unwrap();
    add(&home, r##"just greet MESSAGE[msg="Hello World"#Saludo]"##, &["echo", "MESSAGE"]);

    assert!(home.path().join("extensions.toml").exists());

    just(&home)
        .args(["-n", "greet"])
        .assert()
        .success()
        .stdout("echo Hello World\n");

    just(&home)
        .args(["-n", "greet", "Ana"])
        .assert()
        .success()
        .stdout("echo Ana\n");
}

#[test]
fn hierarchical_names_and_options() {
    let home = tempfile::tempdir().unwrap();
    add(
        &home,
        "just docker ip -f/--format FMT[fmt={{.Id}}] ID[id#Contenedor]",
        &["docker inspect -f FMT ID"],
    );

    just(&home)
        .args(["-n", "docker", "ip", "abc", "--format", "json"])
        .assert()
        .success()
        .stdout("docker inspect -f json abc\n");

    just(&home)
        .args(["ext", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("└─docker"))
        .stdout(predicate::str::contains("└─ip [docker inspect -f FMT ID]"));
}

#[test]
fn varargs_pass_unknown_arguments_through() {
    let home = tempfile::tempdir().unwrap();
    add(&home, "just say [...]", &["echo"]);

    just(&home)
        .args(["-n", "say", "-m", "hello", "--verbose"])
        .assert()
        .success()
        .stdout("echo -m hello --verbose\n");
}

#[test]
fn template_words_are_quoted_when_needed() {
    let home = tempfile::tempdir().unwrap();
    add(&home, "just hi", &["echo", "Hello World"]);

    just(&home)
        .args(["-n", "hi"])
        .assert()
        .success()
        .stdout("echo 'Hello World'\n");
}

#[test]
fn malformed_declarations_are_rejected() {
    let home = tempfile::tempdir().unwrap();
    just(&home)
        .args(["ext", "add", "-d", "just bad X[x:widget]", "echo", "X"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("widget"));

    just(&home)
        .args(["ext", "add", "-d", "just bad X[x]", "echo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no aparece en el comando"));

    assert!(!home.path().join("extensions.toml").exists());
}

#[test]
fn wrong_types_abort_before_running() {
    let home = tempfile::tempdir().unwrap();
    add(&home, "just s N[n:int]", &["seq", "N"]);

    just(&home)
        .args(["-n", "s", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'abc'"));

    just(&home)
        .args(["-n", "s"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Falta el argumento obligatorio 'n'"));
}

#[test]
fn duplicates_need_force() {
    let home = tempfile::tempdir().unwrap();
    add(&home, "just e", &["echo", "a"]);

    just(&home)
        .args(["ext", "add", "-d", "just e", "echo", "b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ya existe"));

    just(&home)
        .args(["ext", "add", "--force", "-d", "just e", "echo", "b"])
        .assert()
        .success();

    just(&home).args(["-n", "e"]).assert().success().stdout("echo b\n");
}

#[test]
fn show_and_remove() {
    let home = tempfile::tempdir().unwrap();
    add(&home, "just greet NAME[name#A quién saludar]", &["echo", "NAME"]);

    just(&home)
        .args(["ext", "show", "greet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Uso: just greet <name>"))
        .stdout(predicate::str::contains("A quién saludar"));

    just(&home)
        .args(["ext", "remove", "-y", "greet"])
        .assert()
        .success();

    just(&home)
        .args(["-n", "greet", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No existe ninguna extensión"));
}

#[test]
fn config_writes_defaults() {
    let home = tempfile::tempdir().unwrap();
    just(&home).args(["ext", "config"]).assert().success();

    let content = std::fs::read_to_string(home.path().join("config.toml")).unwrap();
    assert!(content.contains("echo_commands = true"));
}

#[cfg(unix)]
#[test]
fn runs_the_final_command() {
    let home = tempfile::tempdir().unwrap();
    add(&home, r##"just greet MESSAGE[msg="Hello World"]"##, &["echo", "MESSAGE"]);

    just(&home)
        .arg("greet")
        .assert()
        .success()
        .stdout(predicate::str::contains("> echo Hello World"));

    add(&home, "just fail CODE[code:int]", &["exit", "CODE"]);
    just(&home).args(["fail", "4"]).assert().code(4);
}

#[test]
fn extension_help_comes_from_its_declaration() {
    let home = tempfile::tempdir().unwrap();
    add(&home, r##"just greet MESSAGE[msg="Hello World"#Saludo]"##, &["echo", "MESSAGE"]);

    just(&home)
        .args(["greet", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Uso: just greet [msg]"))
        .stdout(predicate::str::contains("Saludo"));
}

#[test]
fn flags_after_the_name_belong_to_the_extension() {
    let home = tempfile::tempdir().unwrap();
    add(&home, "just cnt -n/--count N[n:int]", &["echo", "N"]);
    add(&home, "just say [...]", &["echo"]);

    just(&home)
        .args(["-n", "cnt", "-n", "5"])
        .assert()
        .success()
        .stdout("echo 5\n");

    just(&home)
        .args(["-n", "say", "-n", "x"])
        .assert()
        .success()
        .stdout("echo -n x\n");

    just(&home)
        .args(["-n", "say", "-V"])
        .assert()
        .success()
        .stdout("echo -V\n");
}
