use crate::pagination::collect_all_pages;

#[tokio::test]
async fn test_collects_items_in_page_order() {
    let mut calls = 0;
    let result: Result<Vec<i32>, String> = collect_all_pages(100, |page_token, limit| {
        calls += 1;
        async move {
            assert_eq!(limit, 100);
            match page_token.as_deref() {
                None => Ok((vec![1, 2], Some("second".to_owned()))),
                Some("second") => Ok((vec![3], Some(String::new()))),
                Some(other) => Err(format!("unexpected token {other}")),
            }
        }
    })
    .await;

    assert_eq!(result.unwrap(), [1, 2, 3]);
    assert_eq!(calls, 2);
}

#[tokio::test]
async fn test_absent_token_ends_the_loop() {
    let mut calls = 0;
    let result: Result<Vec<i32>, String> = collect_all_pages(10, |_, _| {
        calls += 1;
        async move { Ok((vec![7], None)) }
    })
    .await;

    assert_eq!(result.unwrap(), [7]);
    assert_eq!(calls, 1);
}

#[tokio::test]
async fn test_first_error_is_returned() {
    let mut calls = 0;
    let result: Result<Vec<i32>, String> = collect_all_pages(100, |page_token, _| {
        calls += 1;
        async move {
            match page_token {
                None => Ok((vec![1], Some("next".to_owned()))),
                Some(_) => Err("boom".to_owned()),
            }
        }
    })
    .await;

    assert_eq!(result.unwrap_err(), "boom");
    assert_eq!(calls, 2);
}
