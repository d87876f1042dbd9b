use finboard_core::categories::{Category, CategoryFilter, NewCategory, CATEGORIES_DEFAULT_SORT};
use finboard_core::models::{EntityId, EntityKind};

use super::{CrudService, Resource};

pub struct CategoryResource;

impl Resource for CategoryResource {
    type Record = Category;
    type Payload = NewCategory;
    type Filter = CategoryFilter;

    const KIND: EntityKind = EntityKind::Categories;
    const PATH: &'static str = "/categories";
    const DEFAULT_SORT: &'static str = CATEGORIES_DEFAULT_SORT;
    const NAME: &'static str = "Category";

    fn record_id(record: &Category) -> EntityId {
        record.id
    }
}

pub type CategoryService = CrudService<CategoryResource>;
