use kanban_core::{
    KanbanContext, Outcome, Response, TagCreate, TagRecord, TagRepository, TagUpdate,
    WorkItemCreate, WorkItemRepository,
};

fn tag_count(context: &KanbanContext) -> i64 {
    context
        .connection()
        .query_row("SELECT COUNT(*) FROM Tags;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn create_returns_created_conflict_and_bad_request() {
    let context = KanbanContext::open_in_memory().unwrap();
    let repo = context.tags().unwrap();

    let first = repo.create(&TagCreate::new("cool tag"));
    let duplicate = repo.create(&TagCreate::new("cool tag"));
    let too_long = repo.create(&TagCreate::new("k".repeat(51)));
    let second = repo.create(&TagCreate::new("bad tag"));

    assert_eq!(first, Outcome::created(1));
    assert_eq!(duplicate, Outcome::rejected(Response::Conflict));
    assert_eq!(too_long, Outcome::rejected(Response::BadRequest));
    assert_eq!(second, Outcome::created(2));
    assert_eq!(tag_count(&context), 2);
}

#[test]
fn create_accepts_name_at_bound_and_find_returns_it() {
    let context = KanbanContext::open_in_memory().unwrap();
    let repo = context.tags().unwrap();
    let name = "x".repeat(50);

    let outcome = repo.create(&TagCreate::new(name.clone()));
    assert_eq!(outcome.response, Response::Created);

    let found = repo.find(outcome.id.unwrap()).unwrap().unwrap();
    assert_eq!(found.name, name);
}

#[test]
fn names_are_case_sensitive() {
    let context = KanbanContext::open_in_memory().unwrap();
    let repo = context.tags().unwrap();

    assert_eq!(repo.create(&TagCreate::new("Urgent")).response, Response::Created);
    assert_eq!(repo.create(&TagCreate::new("urgent")).response, Response::Created);
}

#[test]
fn find_returns_tag_among_many_and_none_when_absent() {
    let context = KanbanContext::open_in_memory().unwrap();
    let repo = context.tags().unwrap();
    for idx in 0..100 {
        repo.create(&TagCreate::new(format!("tag{idx}")));
    }
    let cool = repo.create(&TagCreate::new("cool tag")).id.unwrap();
    let cooler = repo.create(&TagCreate::new("cooler tag")).id.unwrap();

    assert_eq!(repo.find(cool).unwrap().unwrap().name, "cool tag");
    assert_eq!(repo.find(cooler).unwrap().unwrap().name, "cooler tag");
    assert_eq!(repo.find(9_999).unwrap(), None);
}

#[test]
fn read_returns_all_tags() {
    let context = KanbanContext::open_in_memory().unwrap();
    let repo = context.tags().unwrap();
    let mut expected = Vec::new();
    for idx in 0..100 {
        let name = format!("tag{idx}");
        let id = repo.create(&TagCreate::new(name.clone())).id.unwrap();
        expected.push(TagRecord { id, name });
    }

    assert_eq!(repo.read().unwrap(), expected);
}

#[test]
fn update_renames_and_reports_conflict_without_changes() {
    let context = KanbanContext::open_in_memory().unwrap();
    let repo = context.tags().unwrap();
    let t1 = repo.create(&TagCreate::new("cool tag")).id.unwrap();
    let t2 = repo.create(&TagCreate::new("awesome tag")).id.unwrap();
    let t3 = repo.create(&TagCreate::new("bad tag")).id.unwrap();

    let r1 = repo.update(&TagUpdate::new(t1, "coolest tag"));
    let r2 = repo.update(&TagUpdate::new(t2, "coolest tag"));
    let r3 = repo.update(&TagUpdate::new(t3, "cool tag"));

    assert_eq!(r1, Response::Updated);
    assert_eq!(r2, Response::Conflict);
    assert_eq!(r3, Response::Updated);
    assert_eq!(repo.find(t1).unwrap().unwrap().name, "coolest tag");
    assert_eq!(repo.find(t2).unwrap().unwrap().name, "awesome tag");
    assert_eq!(repo.find(t3).unwrap().unwrap().name, "cool tag");
}

#[test]
fn update_missing_or_oversized_is_rejected() {
    let context = KanbanContext::open_in_memory().unwrap();
    let repo = context.tags().unwrap();
    let id = repo.create(&TagCreate::new("short")).id.unwrap();

    assert_eq!(repo.update(&TagUpdate::new(404, "x")), Response::NotFound);
    assert_eq!(
        repo.update(&TagUpdate::new(id, "y".repeat(51))),
        Response::BadRequest
    );
    assert_eq!(repo.find(id).unwrap().unwrap().name, "short");
}

#[test]
fn delete_is_not_idempotent_in_result() {
    let context = KanbanContext::open_in_memory().unwrap();
    let repo = context.tags().unwrap();
    let id = repo.create(&TagCreate::new("cool tag")).id.unwrap();

    assert_eq!(repo.delete(id), Response::Deleted);
    assert_eq!(repo.delete(id), Response::NotFound);
    assert_eq!(repo.find(id).unwrap(), None);
}

#[test]
fn delete_removes_links_but_keeps_work_items() {
    let context = KanbanContext::open_in_memory().unwrap();
    let tags = context.tags().unwrap();
    let items = context.work_items().unwrap();
    let doomed = tags.create(&TagCreate::new("doomed")).id.unwrap();
    tags.create(&TagCreate::new("kept"));
    let item_id = items
        .create(&WorkItemCreate::new("task").with_tags(["doomed", "kept"]))
        .id
        .unwrap();

    assert_eq!(tags.delete(doomed), Response::Deleted);

    let item = items.find(item_id).unwrap().unwrap();
    assert_eq!(item.tags, vec!["kept".to_string()]);
    assert!(items.read_by_tag("doomed").unwrap().is_empty());
}

#[test]
fn context_stays_usable_after_failed_write() {
    let context = KanbanContext::open_in_memory().unwrap();
    let repo = context.tags().unwrap();
    repo.create(&TagCreate::new("taken"));

    assert_eq!(
        repo.create(&TagCreate::new("taken")).response,
        Response::Conflict
    );
    assert!(context.connection().is_autocommit());
    assert_eq!(repo.create(&TagCreate::new("free")), Outcome::created(2));
}
