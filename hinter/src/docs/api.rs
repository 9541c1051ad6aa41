/*!
# Hinter API documentation

This page describes the API endpoints available on Hinter. Every successful
response is a JSON object with a single key, `data`. Every error response is a
JSON object with a single key, `error`, holding a short message.

## Suggest

Endpoint: `/suggest`

Example: `/suggest?part=amst&class=city&count=5&page=0&with-version=true`

Returns the suggestions for a partially typed search term, best first.

### Query Parameters

- `part` - The term the user has typed so far. Markup is stripped, case and
  punctuation are ignored. A missing or empty term gives no suggestions.
- `class` - Only return suggestions of this class. May be repeated. If absent,
  every class is allowed.
- `exclude-class` - Never return suggestions of this class. May be repeated.
  Wins over `class`.
- `count` - The page size. Without `page`, the list is cut to this many items.
  `0`, missing or not a non-negative integer means no limit.
- `page` - The zero-based page to return. If present and a non-negative
  integer, the response is paginated.
- `with-version` - `1`, `t`, `T`, `true`, `TRUE` or `True` to echo the version
  of the index in the response. Any other value is the same as leaving it out.

A malformed parameter is treated as absent. It never fails the request.

### Response

The shape of `data` depends on the parameters:

| `page` given | `with-version` true | `data`                                                        |
|--------------|---------------------|---------------------------------------------------------------|
| no           | no                  | a list of suggestions                                         |
| no           | yes                 | `{items, version}`                                            |
| yes          | no                  | `{items, pageNumber, totalPagesCount, totalItemsCount}`       |
| yes          | yes                 | `{items, pageNumber, totalPagesCount, totalItemsCount, version}` |

Each suggestion has the keys `id`, `text`, `class` and `weight`.

`totalItemsCount` counts every suggestion that matched, before paging. A page
past the end has no items but still reports the totals.

Every response from this endpoint, errors included, carries the headers
`Access-Control-Allow-Origin: *`, `Access-Control-Allow-Methods: GET, OPTIONS`
and `Access-Control-Allow-Headers: Content-Type`.

## Health

Endpoint: `/health`

Always responds with `{"data": "OK"}` while the server is accepting requests.
*/
