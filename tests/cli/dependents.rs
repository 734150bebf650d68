use crate::helpers::cli::CliTestHelper;
use crate::helpers::harness::with_test_db;
use anyhow::Result;
use predicates::prelude::*;

const DIAMOND_SCHEMA: &str = r#"
CREATE VIEW public.base AS SELECT 1 AS x;
CREATE VIEW public.left_side AS SELECT x FROM public.base;
CREATE VIEW public.right_side AS SELECT x FROM public.base;
CREATE VIEW public.joined AS
  SELECT l.x FROM public.left_side l JOIN public.right_side r USING (x);
CREATE VIEW public.unrelated AS SELECT 2 AS y;
"#;

#[tokio::test]
async fn test_dependents_text() -> Result<()> {
    with_test_db(async |db| -> Result<()> {
        db.execute(DIAMOND_SCHEMA).await;
        let helper = CliTestHelper::new();

        let output = helper
            .command()
            .args(["dependents", "public.base", "--database-url", db.url()])
            .output()?;
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let text = String::from_utf8(output.stdout)?;

        assert!(text.contains("3 dependent relation(s)"));
        let left = text.find("public.left_side").unwrap();
        let right = text.find("public.right_side").unwrap();
        let joined = text.find("public.joined").unwrap();
        assert!(left < right && right < joined);
        assert!(!text.contains("public.unrelated"));
        Ok(())
    })
    .await
    .transpose()?;
    Ok(())
}

#[tokio::test]
async fn test_dependents_json() -> Result<()> {
    with_test_db(async |db| -> Result<()> {
        db.execute(DIAMOND_SCHEMA).await;
        let helper = CliTestHelper::new();

        let output = helper
            .command()
            .args(["dependents", "public.base", "--format", "json", "--database-url", db.url()])
            .output()?;
        assert!(output.status.success());

        let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        let names: Vec<&str> = report["rebuild_order"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["left_side", "right_side", "joined"]);
        assert_eq!(report["edges"].as_array().unwrap().len(), 4);
        Ok(())
    })
    .await
    .transpose()?;
    Ok(())
}

#[tokio::test]
async fn test_dependents_dot() -> Result<()> {
    with_test_db(async |db| -> Result<()> {
        db.execute(DIAMOND_SCHEMA).await;
        let helper = CliTestHelper::new();

        helper
            .command()
            .args(["dependents", "public.base", "--format", "dot", "--database-url", db.url()])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("digraph").and(predicate::str::contains("public.joined")));
        Ok(())
    })
    .await
    .transpose()?;
    Ok(())
}

#[tokio::test]
async fn test_view_without_dependents() -> Result<()> {
    with_test_db(async |db| -> Result<()> {
        db.execute(DIAMOND_SCHEMA).await;
        let helper = CliTestHelper::new();

        helper
            .command()
            .args(["dependents", "public.unrelated", "--database-url", db.url()])
            .assert()
            .success()
            .stdout(predicate::str::contains("no dependent relations"));
        Ok(())
    })
    .await
    .transpose()?;
    Ok(())
}
